use crate::models::{CurveType, Summary};

const NO_SIGNAL_EN: &str =
    "No epidemiological week/date exceeded the Action Line. No outbreak signal was detected.";
const NO_SIGNAL_BM: &str = "Tiada minggu epidemiologi atau tarikh yang melepasi Garisan Tindakan. \
     Tiada isyarat wabak dikesan.";

fn unit_en(curve: CurveType) -> &'static str {
    match curve {
        CurveType::Weekly => "epidemiological week(s)",
        CurveType::Daily => "date(s)",
    }
}

fn unit_bm(curve: CurveType) -> &'static str {
    match curve {
        CurveType::Weekly => "minggu epidemiologi",
        CurveType::Daily => "tarikh",
    }
}

/// Builds the English and Bahasa Melayu narrative for the flagged buckets.
///
/// Both strings always agree on whether an exceedance was found.
pub fn generate_summary(exceeding: &[String], curve: CurveType) -> Summary {
    if exceeding.is_empty() {
        return Summary {
            en: NO_SIGNAL_EN.to_string(),
            bm: NO_SIGNAL_BM.to_string(),
        };
    }

    let labels = exceeding.join(", ");
    Summary {
        en: format!(
            "Cases exceeded the Action Line in {}: {}, suggesting possible outbreak(s) \
             requiring further investigation.",
            unit_en(curve),
            labels
        ),
        bm: format!(
            "Bilangan kes melepasi Garisan Tindakan pada {} {}, menunjukkan kemungkinan \
             kejadian wabak yang memerlukan siasatan lanjut.",
            unit_bm(curve),
            labels
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_exceedance_uses_canned_sentences() {
        for curve in [CurveType::Weekly, CurveType::Daily] {
            let summary = generate_summary(&[], curve);
            assert_eq!(
                summary.en,
                "No epidemiological week/date exceeded the Action Line. No outbreak signal was detected."
            );
            assert_eq!(
                summary.bm,
                "Tiada minggu epidemiologi atau tarikh yang melepasi Garisan Tindakan. Tiada isyarat wabak dikesan."
            );
        }
    }

    #[test]
    fn weekly_exceedance_names_weeks() {
        let labels = vec!["W6".to_string(), "W9".to_string()];
        let summary = generate_summary(&labels, CurveType::Weekly);
        assert_eq!(
            summary.en,
            "Cases exceeded the Action Line in epidemiological week(s): W6, W9, suggesting possible outbreak(s) requiring further investigation."
        );
        assert_eq!(
            summary.bm,
            "Bilangan kes melepasi Garisan Tindakan pada minggu epidemiologi W6, W9, menunjukkan kemungkinan kejadian wabak yang memerlukan siasatan lanjut."
        );
    }

    #[test]
    fn daily_exceedance_names_dates() {
        let labels = vec!["2023-05-03".to_string()];
        let summary = generate_summary(&labels, CurveType::Daily);
        assert!(summary.en.contains("in date(s): 2023-05-03,"));
        assert!(summary.bm.contains("pada tarikh 2023-05-03,"));
    }

    #[test]
    fn labels_keep_given_order_in_both_languages() {
        let labels = vec!["W40".to_string(), "W2".to_string()];
        let summary = generate_summary(&labels, CurveType::Weekly);
        assert!(summary.en.contains("W40, W2"));
        assert!(summary.bm.contains("W40, W2"));
    }
}
