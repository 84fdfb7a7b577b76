//! Parsing swap exports into [`Trade`] records.

use super::SourceError;
use crate::domain::{Decimal, Timestamp, Token, Trade};

/// Parse a JSON array of trades (camelCase field names, amounts as strings or numbers).
pub fn load_trades_json(bytes: &[u8]) -> Result<Vec<Trade>, SourceError> {
    let trades: Vec<Trade> = serde_json::from_slice(bytes)?;
    Ok(trades)
}

/// Parse a flat CSV export with one row per swap.
///
/// Expected header:
/// `signature,timestamp,in_address,in_symbol,in_decimals,out_address,out_symbol,out_decimals,
/// amount_in,amount_out,price_usd,value_usd,venue`
pub fn load_trades_csv(bytes: &[u8]) -> Result<Vec<Trade>, SourceError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        signature: String,
        timestamp: i64,
        in_address: String,
        in_symbol: String,
        in_decimals: u8,
        out_address: String,
        out_symbol: String,
        out_decimals: u8,
        amount_in: String,
        amount_out: String,
        price_usd: String,
        value_usd: String,
        #[serde(default)]
        venue: Option<String>,
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal, SourceError> {
        Decimal::from_str_canonical(value).map_err(|e| SourceError::InvalidField {
            field: field.to_string(),
            message: format!("{:?}: {}", value, e),
        })
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let mut trades = Vec::new();
    for record in reader.deserialize::<Row>() {
        let row = record?;
        trades.push(Trade::new(
            row.signature,
            Timestamp::new(row.timestamp),
            Token::new(row.in_address, row.in_symbol, row.in_decimals),
            Token::new(row.out_address, row.out_symbol, row.out_decimals),
            parse_decimal("amount_in", &row.amount_in)?,
            parse_decimal("amount_out", &row.amount_out)?,
            parse_decimal("price_usd", &row.price_usd)?,
            parse_decimal("value_usd", &row.value_usd)?,
            row.venue.unwrap_or_default(),
        ));
    }

    Ok(trades)
}
