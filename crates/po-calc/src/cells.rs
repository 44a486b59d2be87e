//! 試算表儲存格清理
//!
//! 回傳 `Ok(None)` 表示空白儲存格，`Err` 為無法解析的內容（附原因），
//! 由呼叫端決定預設值並記錄警告。

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 支援的日期格式（依序嘗試；兩位數年份須先於四位數年份）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Excel 序號日期的起點
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 序號日期上限（9999-12-31）
const EXCEL_MAX_SERIAL: u64 = 2_958_465;

/// 解析金額：去除貨幣符號、千分位與空白
pub fn parse_decimal(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '£' | '€' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(Some)
        .map_err(|_| format!("無法解析數值 '{}'", raw.trim()))
}

/// 解析件數：小數無條件捨去，負數視為無效
pub fn parse_units(raw: &str) -> Result<Option<u32>, String> {
    let Some(value) = parse_decimal(raw)? else {
        return Ok(None);
    };
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("件數不可為負數 '{}'", raw.trim()));
    }
    value
        .trunc()
        .to_u32()
        .map(Some)
        .ok_or_else(|| format!("件數超出範圍 '{}'", raw.trim()))
}

/// 解析勾選欄：只有 `TRUE`（不分大小寫）為真
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("TRUE")
}

/// 寬鬆解析日期
///
/// 依序嘗試 [`DATE_FORMATS`]，再嘗試 ISO 日期時間的日期部分，最後以 Excel 序號解析。
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Ok(Some(date));
    }

    if let Some((date, _)) = text.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Ok(Some(date));
        }
    }

    excel_serial(text)
        .map(Some)
        .ok_or_else(|| format!("無法解析日期 '{}'", text))
}

fn excel_serial(text: &str) -> Option<NaiveDate> {
    let serial = Decimal::from_str(text).ok()?;
    if serial.is_sign_negative() || serial.is_zero() {
        return None;
    }
    let days = serial.trunc().to_u64()?;
    if days > EXCEL_MAX_SERIAL {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)?.checked_add_days(Days::new(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("$1,250.50", Some(Decimal::new(125050, 2)))]
    #[case("£ 12", Some(Decimal::from(12)))]
    #[case("€3,000", Some(Decimal::from(3000)))]
    #[case("-4.5", Some(Decimal::new(-45, 1)))]
    #[case("", None)]
    #[case("  ", None)]
    fn test_parse_decimal(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_decimal(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_decimal_rejects_text() {
        assert!(parse_decimal("TBC").is_err());
    }

    #[rstest]
    #[case("120", Some(120))]
    #[case("1,200", Some(1200))]
    #[case("99.9", Some(99))]
    #[case("0", Some(0))]
    #[case("", None)]
    fn test_parse_units(#[case] raw: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_units(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("-5")]
    #[case("lots")]
    #[case("99999999999")]
    fn test_parse_units_invalid(#[case] raw: &str) {
        assert!(parse_units(raw).is_err());
    }

    #[rstest]
    #[case("TRUE", true)]
    #[case(" true ", true)]
    #[case("FALSE", false)]
    #[case("yes", false)]
    #[case("", false)]
    fn test_parse_flag(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_flag(raw), expected);
    }

    #[rstest]
    #[case("2025-01-15", date(2025, 1, 15))]
    #[case("15/01/2025", date(2025, 1, 15))]
    #[case("15/01/25", date(2025, 1, 15))]
    #[case("7-Jan-2025", date(2025, 1, 7))]
    #[case("07-Jan-25", date(2025, 1, 7))]
    #[case("7 Jan 2025", date(2025, 1, 7))]
    #[case("7 January 2025", date(2025, 1, 7))]
    #[case("2025-01-15T00:00:00", date(2025, 1, 15))]
    #[case("45672", date(2025, 1, 15))]
    fn test_parse_date(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(raw).unwrap(), Some(expected));
    }

    #[test]
    fn test_parse_date_blank_and_invalid() {
        assert_eq!(parse_date("   ").unwrap(), None);
        assert!(parse_date("next week").is_err());
        assert!(parse_date("-3").is_err());
    }
}
