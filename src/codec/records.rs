use crate::codec::tabular::{cell, Column, TabularRecord};
use crate::core::bill::{Bill, PaymentRow};
use crate::core::error::{EngineError, EngineResult};
use crate::core::invoice::InvoiceRow;
use crate::core::money::{ensure_positive, format_date, format_money, parse_date, parse_decimal};
use crate::core::party::{Party, PartyName};
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

const DATE: Column = Column::new("Date", &["payment date", "invoice date", "bill date"]);
const BILL: Column = Column::new("Bill", &["bill no", "bill id", "invoice no", "invoice number"]);
const PARTY: Column = Column::new("Party Name", &["party", "name"]);
const AMOUNT: Column = Column::new("Amount", &["payment amount", "invoice amount", "value"]);

fn date_cell(record: &StringRecord, index: usize, row: usize) -> EngineResult<NaiveDate> {
    let raw = cell(record, index, "date", row)?;
    parse_date(raw).ok_or_else(|| EngineError::malformed(row, format!("invalid date '{raw}'")))
}

fn decimal_cell(
    record: &StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> EngineResult<Decimal> {
    let raw = cell(record, index, name, row)?;
    parse_decimal(raw)
        .ok_or_else(|| EngineError::malformed(row, format!("non-numeric {name} '{raw}'")))
}

fn party_cell(record: &StringRecord, index: usize, row: usize) -> EngineResult<PartyName> {
    let raw = cell(record, index, "party name", row)?;
    PartyName::new(raw).map_err(|e| EngineError::malformed(row, e.to_string()))
}

/// Domain validation failures are reported against the row they came from.
fn at_row<T>(result: EngineResult<T>, row: usize) -> EngineResult<T> {
    result.map_err(|e| match e {
        EngineError::MalformedRow { .. } => e,
        other => EngineError::malformed(row, other.to_string()),
    })
}

impl TabularRecord for Party {
    const COLUMNS: &'static [Column] = &[
        PARTY,
        Column::new("Balance", &["amount", "balance amount"]),
    ];

    fn to_record(&self) -> Vec<String> {
        vec![self.name.to_string(), format_money(self.balance)]
    }

    fn from_record(record: &StringRecord, row: usize) -> EngineResult<Self> {
        let name = party_cell(record, 0, row)?;
        let balance = decimal_cell(record, 1, "balance", row)?;
        at_row(Party::new(name, balance), row)
    }
}

impl TabularRecord for Bill {
    const COLUMNS: &'static [Column] = &[DATE, BILL, PARTY, AMOUNT];
    const DATE_COLUMN: Option<usize> = Some(0);

    fn to_record(&self) -> Vec<String> {
        vec![
            format_date(self.date()),
            self.bill_id().to_string(),
            self.party().to_string(),
            format_money(self.amount()),
        ]
    }

    fn from_record(record: &StringRecord, row: usize) -> EngineResult<Self> {
        let date = date_cell(record, 0, row)?;
        let bill_id = cell(record, 1, "bill", row)?;
        let party = party_cell(record, 2, row)?;
        let amount = decimal_cell(record, 3, "amount", row)?;
        at_row(Bill::new(date, bill_id, party, amount), row)
    }
}

impl TabularRecord for PaymentRow {
    const COLUMNS: &'static [Column] = &[DATE, BILL, PARTY, AMOUNT];
    const DATE_COLUMN: Option<usize> = Some(0);

    fn to_record(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.bill_id.clone(),
            self.party.to_string(),
            format_money(self.amount),
        ]
    }

    fn from_record(record: &StringRecord, row: usize) -> EngineResult<Self> {
        let amount = decimal_cell(record, 3, "amount", row)?;
        Ok(Self {
            date: date_cell(record, 0, row)?,
            bill_id: cell(record, 1, "bill", row)?.to_string(),
            party: party_cell(record, 2, row)?,
            amount: at_row(ensure_positive(amount, "payment amount"), row)?,
        })
    }
}

impl TabularRecord for InvoiceRow {
    const COLUMNS: &'static [Column] = &[
        Column::new("Number", &["invoice number"]),
        Column::new("Invoice No", &["label"]),
        Column::new("Invoice Date", &["date"]),
        PARTY,
        Column::new("Product", &[]),
        Column::new("Quantity", &["quantity (kg)", "qty"]),
        Column::new("Rate", &["pur. rate", "purchase rate"]),
        Column::new("Margin (%)", &["margin"]),
        Column::new("Sale Rate", &[]),
        Column::new("Amount", &["invoice value"]),
        Column::new("Balance Remaining", &["remaining balance"]),
    ];
    const DATE_COLUMN: Option<usize> = Some(2);

    fn to_record(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.label(),
            format_date(self.date),
            self.party.to_string(),
            self.product.clone(),
            self.quantity.normalize().to_string(),
            format_money(self.rate),
            format_money(self.margin),
            format_money(self.sale_rate()),
            format_money(self.amount),
            format_money(self.remaining_balance),
        ]
    }

    /// Label and sale rate are derived from the other columns and ignored.
    fn from_record(record: &StringRecord, row: usize) -> EngineResult<Self> {
        let raw_number = cell(record, 0, "number", row)?;
        let number = raw_number.parse::<u64>().map_err(|_| {
            EngineError::malformed(row, format!("invalid invoice number '{raw_number}'"))
        })?;
        Ok(Self {
            number,
            date: date_cell(record, 2, row)?,
            party: party_cell(record, 3, row)?,
            product: cell(record, 4, "product", row)?.to_string(),
            quantity: decimal_cell(record, 5, "quantity", row)?,
            rate: decimal_cell(record, 6, "rate", row)?,
            margin: decimal_cell(record, 7, "margin", row)?,
            amount: decimal_cell(record, 9, "amount", row)?,
            remaining_balance: decimal_cell(record, 10, "balance remaining", row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tabular::{decode, encode, DecodeOptions};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_decode_bills_with_header() {
        let text = "Date,Bill,Party Name,Amount\n\
                    01-01-2024,B1,PartyA,25000\n\
                    2024-01-01,B2,PartyA,\"10,000.00\"\n";
        let bills: Vec<Bill> = decode(text, &DecodeOptions::default()).unwrap();
        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].date(), day(1));
        assert_eq!(bills[1].bill_id(), "B2");
        assert_eq!(bills[1].amount(), dec!(10000));
    }

    #[test]
    fn test_decode_without_header() {
        let text = "Acme Traders, 150000\nGlobex,99000.50\n";
        let parties: Vec<Party> = decode(text, &DecodeOptions::default()).unwrap();
        assert_eq!(parties.len(), 2);
        assert_eq!(parties[0].name.as_str(), "Acme Traders");
        assert_eq!(parties[1].balance, dec!(99000.50));
    }

    #[test]
    fn test_header_aliases_recognised() {
        let text = "date,bill no,party,payment amount\n01-01-2024,B1,A,100\n";
        let rows: Vec<PaymentRow> = decode(text, &DecodeOptions::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_wrong_column_count_fails_with_row() {
        let text = "Date,Bill,Party Name,Amount\n01-01-2024,B1,A,100\n02-01-2024,B2,A\n";
        let err = decode::<Bill>(text, &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            EngineError::malformed(3, "expected 4 columns, found 3")
        );
    }

    #[test]
    fn test_non_numeric_amount_fails_fast() {
        let text = "01-01-2024,B1,A,abc\n01-01-2024,B2,A,100\n";
        let err = decode::<Bill>(text, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn test_two_digit_year_rejected() {
        let text = "Date,Bill,Party Name,Amount\n01-01-2024,B1,A,5\n01-02-24,B2,A,5\n";
        let err = decode::<Bill>(text, &DecodeOptions::default()).unwrap_err();
        assert_eq!(err, EngineError::malformed(3, "invalid date '01-02-24'"));
    }

    #[test]
    fn test_non_positive_amount_reported_against_row() {
        let text = "Date,Bill,Party Name,Amount\n01-01-2024,B1,A,-5\n";
        let err = decode::<Bill>(text, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn test_summary_rows() {
        let text = "Date,Bill,Party Name,Amount\n01-01-2024,B1,A,100\nTotal,,,100\n";
        assert!(decode::<Bill>(text, &DecodeOptions::default()).is_err());

        let options = DecodeOptions {
            skip_summary_rows: true,
        };
        let bills: Vec<Bill> = decode(text, &options).unwrap();
        assert_eq!(bills.len(), 1);
    }

    #[test]
    fn test_encode_payments() {
        let rows = vec![PaymentRow {
            date: day(2),
            bill_id: "B1".into(),
            party: PartyName::new("Party, Inc").unwrap(),
            amount: dec!(5000),
        }];
        let text = encode(&rows).unwrap();
        assert_eq!(text, "Date,Bill,Party Name,Amount\n02-01-2024,B1,\"Party, Inc\",5000.00\n");
    }

    #[test]
    fn test_payment_round_trip() {
        let rows = vec![
            PaymentRow {
                date: day(1),
                bill_id: "B1".into(),
                party: PartyName::new("A").unwrap(),
                amount: dec!(20000),
            },
            PaymentRow {
                date: day(2),
                bill_id: "B1".into(),
                party: PartyName::new("A").unwrap(),
                amount: dec!(5000.25),
            },
        ];
        let decoded: Vec<PaymentRow> =
            decode(&encode(&rows).unwrap(), &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_invoice_round_trip() {
        let row = InvoiceRow {
            number: 12,
            date: day(15),
            party: PartyName::new("UNR- Sharma").unwrap(),
            product: "Cotton".into(),
            quantity: dec!(886.9591),
            rate: dec!(22.10),
            margin: dec!(2.31),
            amount: dec!(20053.73),
            remaining_balance: dec!(5000),
        };
        let text = encode(std::slice::from_ref(&row)).unwrap();
        assert!(text.contains("JAN-012"));
        let decoded: Vec<InvoiceRow> = decode(&text, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, vec![row]);
    }
}
