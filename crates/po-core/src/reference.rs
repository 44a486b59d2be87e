//! 出貨參考碼解析
//!
//! 參考碼格式為 `<基礎單號><目的地><運輸方式>`，例如 `GWG048UKSEA`、
//! `GWG048USAAIR`。沒有後綴的參考碼（如 `GWG048`）表示採購單尚未拆單。
//!
//! 只比對字串結尾，不處理字詞邊界：基礎單號本身若以 `US` 結尾且緊接運輸方式，
//! 會被誤判為後綴。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::shipment::{Destination, TransportMode};

/// 目的地判斷：目的地代碼後可接運輸方式
static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(USA|US|UK)(SEA|AIR|TRUCK)?$").expect("destination pattern is valid")
});

/// 基礎單號：移除結尾完整的「目的地 + 運輸方式」
static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(USA|UK|US)(SEA|AIR|TRUCK)$").expect("suffix pattern is valid")
});

/// 參考碼解析結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// 基礎單號
    pub base: String,

    /// 目的地（無後綴時為 `None`）
    pub destination: Option<Destination>,

    /// 運輸方式（無標記時預設海運）
    pub mode: TransportMode,

    /// 是否移除了後綴
    pub has_suffix: bool,
}

impl ParsedReference {
    /// 無後綴：採購單仍待拆單
    pub fn is_pending_split(&self) -> bool {
        !self.has_suffix
    }
}

/// 清理參考碼：去除前後空白與 `/`
pub fn normalize_reference(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '/').collect()
}

/// 解析參考碼，永不失敗
pub fn parse_reference(raw: &str) -> ParsedReference {
    let cleaned = normalize_reference(raw);

    let mode = if cleaned.contains("AIR") {
        TransportMode::Air
    } else if cleaned.contains("TRUCK") {
        TransportMode::Truck
    } else {
        TransportMode::Sea
    };

    let destination = DESTINATION_RE
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| match m.as_str() {
            "UK" => Destination::Uk,
            _ => Destination::Us,
        });

    let base = match SUFFIX_RE.find(&cleaned) {
        Some(m) => cleaned[..m.start()].to_string(),
        None => cleaned.clone(),
    };
    let has_suffix = base.len() != cleaned.len();

    ParsedReference {
        base,
        destination,
        mode,
        has_suffix,
    }
}

/// 組成出貨參考碼（`parse_reference` 的反函數）
pub fn build_reference(base: &str, destination: Destination, mode: TransportMode) -> String {
    format!("{}{}{}", base, destination.reference_code(), mode.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("GWG048UKSEA", "GWG048", Some(Destination::Uk), TransportMode::Sea)]
    #[case("GWG048USASEA", "GWG048", Some(Destination::Us), TransportMode::Sea)]
    #[case("GWG048USSEA", "GWG048", Some(Destination::Us), TransportMode::Sea)]
    #[case("GWG048USAAIR", "GWG048", Some(Destination::Us), TransportMode::Air)]
    #[case("GWG048USAIR", "GWG048", Some(Destination::Us), TransportMode::Air)]
    #[case("TSH096UKTRUCK", "TSH096", Some(Destination::Uk), TransportMode::Truck)]
    #[case(" GWG/048UKAIR ", "GWG048", Some(Destination::Uk), TransportMode::Air)]
    fn test_parse_suffixed(
        #[case] raw: &str,
        #[case] base: &str,
        #[case] destination: Option<Destination>,
        #[case] mode: TransportMode,
    ) {
        let parsed = parse_reference(raw);
        assert_eq!(parsed.base, base);
        assert_eq!(parsed.destination, destination);
        assert_eq!(parsed.mode, mode);
        assert!(parsed.has_suffix);
    }

    #[test]
    fn test_parse_without_suffix() {
        let parsed = parse_reference("GWG048");
        assert_eq!(parsed.base, "GWG048");
        assert_eq!(parsed.destination, None);
        assert_eq!(parsed.mode, TransportMode::Sea);
        assert!(!parsed.has_suffix);
        assert!(parsed.is_pending_split());
    }

    #[test]
    fn test_destination_without_mode_keeps_base() {
        // 有目的地但缺運輸方式：不視為完整後綴
        let parsed = parse_reference("GWG048UK");
        assert_eq!(parsed.destination, Some(Destination::Uk));
        assert_eq!(parsed.base, "GWG048UK");
        assert!(!parsed.has_suffix);
    }

    #[test]
    fn test_marker_inside_base_is_not_stripped() {
        let parsed = parse_reference("UKA100");
        assert_eq!(parsed.base, "UKA100");
        assert_eq!(parsed.destination, None);
        assert!(!parsed.has_suffix);
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference("  GWG/048/UKSEA "), "GWG048UKSEA");
        assert_eq!(normalize_reference(""), "");
    }

    #[test]
    fn test_build_reference() {
        assert_eq!(
            build_reference("GWG048", Destination::Uk, TransportMode::Sea),
            "GWG048UKSEA"
        );
        assert_eq!(
            build_reference("GWG048", Destination::Us, TransportMode::Air),
            "GWG048USAAIR"
        );
    }

    fn destination_strategy() -> impl Strategy<Value = Destination> {
        prop_oneof![Just(Destination::Uk), Just(Destination::Us)]
    }

    fn mode_strategy() -> impl Strategy<Value = TransportMode> {
        prop_oneof![
            Just(TransportMode::Sea),
            Just(TransportMode::Air),
            Just(TransportMode::Truck)
        ]
    }

    /// 不含任何目的地或運輸方式標記的基礎單號
    fn base_strategy() -> impl Strategy<Value = String> {
        "[A-Z]{2,4}[0-9]{2,4}".prop_filter("base must not contain markers", |s| {
            ["UK", "US", "SEA", "AIR", "TRUCK"]
                .iter()
                .all(|marker| !s.contains(marker))
        })
    }

    proptest! {
        #[test]
        fn prop_build_then_parse_is_identity(
            base in base_strategy(),
            destination in destination_strategy(),
            mode in mode_strategy(),
        ) {
            let parsed = parse_reference(&build_reference(&base, destination, mode));
            prop_assert_eq!(parsed.base, base);
            prop_assert_eq!(parsed.destination, Some(destination));
            prop_assert_eq!(parsed.mode, mode);
            prop_assert!(parsed.has_suffix);
        }

        #[test]
        fn prop_plain_code_suffix_also_parses(
            base in base_strategy(),
            destination in destination_strategy(),
            mode in mode_strategy(),
        ) {
            let raw = format!("{}{}{}", base, destination.code(), mode.code());
            let parsed = parse_reference(&raw);
            prop_assert_eq!(parsed.base, base);
            prop_assert_eq!(parsed.destination, Some(destination));
            prop_assert_eq!(parsed.mode, mode);
            prop_assert!(parsed.has_suffix);
        }

        #[test]
        fn prop_no_trailing_marker_means_no_suffix(base in base_strategy()) {
            let parsed = parse_reference(&base);
            prop_assert!(!parsed.has_suffix);
            prop_assert_eq!(parsed.destination, None);
            prop_assert_eq!(parsed.base, base);
        }

        #[test]
        fn prop_mode_defaults_to_sea(raw in "[A-Z0-9/ ]{0,16}") {
            prop_assume!(!raw.contains("AIR") && !raw.contains("TRUCK"));
            prop_assert_eq!(parse_reference(&raw).mode, TransportMode::Sea);
        }
    }
}
