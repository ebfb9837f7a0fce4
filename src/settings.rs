use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::model::{Orientation, SectionProperties};

/// MIME type for Office Open XML word-processing documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A4 page in twips.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;

/// Per-conversion options. All keys are optional in the incoming JSON
/// mapping; missing keys fall back to the documented defaults. Immutable
/// once constructed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub font_family_east_asia: String,
    pub font_size: f32,
    pub line_spacing: f32,
    pub para_spacing_after: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub page_orientation: PageOrientation,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub enum PageOrientation {
    #[default]
    #[serde(rename = "PORTRAIT")]
    Portrait,
    #[serde(rename = "LANDSCAPE")]
    Landscape,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            font_family_east_asia: "맑은 고딕".to_string(),
            font_size: 10.5,
            line_spacing: 1.0,
            para_spacing_after: 8.0,
            margin_top: 2.0,
            margin_bottom: 2.0,
            margin_left: 2.5,
            margin_right: 2.5,
            page_orientation: PageOrientation::Portrait,
        }
    }
}

pub(crate) fn cm_to_twips(cm: f32) -> u32 {
    (cm * 360_000.0 / 635.0).round().max(0.0) as u32
}

impl Settings {
    /// Resolve page geometry. Landscape swaps the page dimensions, as the
    /// original editor did; margins stay on their named edges.
    pub fn section_properties(&self) -> Result<SectionProperties, Error> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(Error::Settings(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        for (name, value) in [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Settings(format!(
                    "{name} must be a non-negative length in cm, got {value}"
                )));
            }
        }

        let (page_width, page_height, orientation) = match self.page_orientation {
            PageOrientation::Portrait => (PAGE_WIDTH, PAGE_HEIGHT, Orientation::Portrait),
            PageOrientation::Landscape => (PAGE_HEIGHT, PAGE_WIDTH, Orientation::Landscape),
        };

        let props = SectionProperties {
            page_width,
            page_height,
            margin_top: cm_to_twips(self.margin_top),
            margin_bottom: cm_to_twips(self.margin_bottom),
            margin_left: cm_to_twips(self.margin_left),
            margin_right: cm_to_twips(self.margin_right),
            orientation,
        };
        if props.margin_left + props.margin_right >= props.page_width {
            return Err(Error::Settings(
                "left and right margins leave no room for text".into(),
            ));
        }
        Ok(props)
    }
}

/// Client-facing filename: the title when one is given, otherwise a
/// timestamped fallback computed in Korean standard time (UTC+9).
pub fn generate_filename(title: &str) -> String {
    generate_filename_at(title, Utc::now())
}

pub(crate) fn generate_filename_at(title: &str, now: DateTime<Utc>) -> String {
    let title = title.trim();
    if title.is_empty() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let now_kst = now.with_timezone(&kst);
        format!("{}.docx", now_kst.format("제목없음_%y%m%d_T%H%M%S"))
    } else {
        format!("{title}.docx")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.font_family_east_asia, "맑은 고딕");
        assert_eq!(s.font_size, 10.5);
        assert_eq!(s.line_spacing, 1.0);
        assert_eq!(s.para_spacing_after, 8.0);
        assert_eq!(s.margin_left, 2.5);
        assert_eq!(s.page_orientation, PageOrientation::Portrait);
    }

    #[test]
    fn settings_deserialize_with_partial_keys() {
        let s: Settings =
            serde_json::from_str(r#"{"font_size": 12.0, "page_orientation": "LANDSCAPE"}"#)
                .unwrap();
        assert_eq!(s.font_size, 12.0);
        assert_eq!(s.page_orientation, PageOrientation::Landscape);
        assert_eq!(s.margin_top, 2.0);
    }

    #[test]
    fn landscape_swaps_page_dimensions() {
        let mut s = Settings::default();
        s.page_orientation = PageOrientation::Landscape;
        let props = s.section_properties().unwrap();
        assert_eq!(props.page_width, PAGE_HEIGHT);
        assert_eq!(props.page_height, PAGE_WIDTH);
        assert_eq!(props.orientation, Orientation::Landscape);
    }

    #[test]
    fn oversized_margins_are_rejected() {
        let mut s = Settings::default();
        s.margin_left = 15.0;
        s.margin_right = 15.0;
        assert!(matches!(s.section_properties(), Err(Error::Settings(_))));
    }

    #[test]
    fn filename_uses_title_when_present() {
        assert_eq!(generate_filename("Report"), "Report.docx");
        assert_eq!(generate_filename("  Report "), "Report.docx");
    }

    #[test]
    fn fallback_filename_is_stamped_in_utc_plus_nine() {
        // 2024-03-01 23:30:00 UTC is 2024-03-02 08:30:00 KST.
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(
            generate_filename_at("", instant),
            "제목없음_240302_T083000.docx"
        );
        assert_eq!(
            generate_filename_at("   ", instant),
            "제목없음_240302_T083000.docx"
        );
    }
}
