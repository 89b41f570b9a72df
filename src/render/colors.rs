//! Residue color schemes

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::analysis::{is_gap, residue_properties};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Clustal2,
    Zappo,
    Taylor,
    #[serde(alias = "hydro")]
    Hydrophobicity,
    Conservation,
    Nucleotide,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::Clustal2
    }
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        Self::Clustal2,
        Self::Zappo,
        Self::Taylor,
        Self::Hydrophobicity,
        Self::Conservation,
        Self::Nucleotide,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clustal2 => "Clustal2",
            Self::Zappo => "Zappo",
            Self::Taylor => "Taylor",
            Self::Hydrophobicity => "Hydrophobicity",
            Self::Conservation => "Conservation",
            Self::Nucleotide => "Nucleotide",
        }
    }
}

/// Background for gaps and residues a scheme leaves uncolored
pub const BACKGROUND: Color32 = Color32::from_rgb(250, 250, 250);
pub const TEXT: Color32 = Color32::from_rgb(30, 30, 30);

/// Tile fill for one residue.
///
/// `conservation` is the column's score in percent and is only read by the
/// conservation scheme.
pub fn residue_color(scheme: ColorScheme, residue: u8, conservation: f64) -> Color32 {
    if is_gap(residue) {
        return BACKGROUND;
    }
    let r = residue.to_ascii_uppercase();
    match scheme {
        ColorScheme::Clustal2 => clustal2(r),
        ColorScheme::Zappo => zappo(r),
        ColorScheme::Taylor => taylor(r),
        ColorScheme::Hydrophobicity => hydrophobicity(r),
        ColorScheme::Conservation => conservation_color(conservation),
        ColorScheme::Nucleotide => nucleotide(r),
    }
}

fn clustal2(r: u8) -> Color32 {
    match r {
        b'A' | b'I' | b'L' | b'M' | b'F' | b'W' | b'V' | b'C' => Color32::from_rgb(128, 160, 240),
        b'K' | b'R' => Color32::from_rgb(240, 21, 5),
        b'E' | b'D' => Color32::from_rgb(192, 72, 192),
        b'N' | b'Q' | b'S' | b'T' => Color32::from_rgb(21, 192, 21),
        b'G' => Color32::from_rgb(240, 144, 72),
        b'P' => Color32::from_rgb(192, 192, 0),
        b'H' | b'Y' => Color32::from_rgb(21, 164, 164),
        _ => BACKGROUND,
    }
}

fn zappo(r: u8) -> Color32 {
    match r {
        b'I' | b'L' | b'V' | b'A' | b'M' => Color32::from_rgb(255, 175, 175),
        b'F' | b'W' | b'Y' => Color32::from_rgb(255, 200, 0),
        b'K' | b'R' | b'H' => Color32::from_rgb(100, 100, 255),
        b'D' | b'E' => Color32::from_rgb(255, 0, 0),
        b'S' | b'T' | b'N' | b'Q' => Color32::from_rgb(0, 255, 0),
        b'P' | b'G' => Color32::from_rgb(255, 0, 255),
        b'C' => Color32::from_rgb(255, 255, 0),
        _ => BACKGROUND,
    }
}

fn taylor(r: u8) -> Color32 {
    match r {
        b'A' => Color32::from_rgb(204, 255, 0),
        b'R' => Color32::from_rgb(0, 0, 255),
        b'N' => Color32::from_rgb(204, 0, 255),
        b'D' => Color32::from_rgb(255, 0, 0),
        b'C' => Color32::from_rgb(255, 255, 0),
        b'Q' => Color32::from_rgb(255, 0, 204),
        b'E' => Color32::from_rgb(255, 0, 102),
        b'G' => Color32::from_rgb(255, 153, 0),
        b'H' => Color32::from_rgb(0, 102, 255),
        b'I' => Color32::from_rgb(102, 255, 0),
        b'L' => Color32::from_rgb(51, 255, 0),
        b'K' => Color32::from_rgb(102, 0, 255),
        b'M' => Color32::from_rgb(0, 255, 0),
        b'F' => Color32::from_rgb(0, 255, 102),
        b'P' => Color32::from_rgb(255, 204, 0),
        b'S' => Color32::from_rgb(255, 51, 0),
        b'T' => Color32::from_rgb(255, 102, 0),
        b'W' => Color32::from_rgb(0, 204, 255),
        b'Y' => Color32::from_rgb(0, 255, 204),
        b'V' => Color32::from_rgb(153, 255, 0),
        _ => BACKGROUND,
    }
}

/// Blue (hydrophilic) to red (hydrophobic) on the Kyte-Doolittle scale
fn hydrophobicity(r: u8) -> Color32 {
    let props = residue_properties(r);
    if props.property == "Unknown" {
        return BACKGROUND;
    }
    let t = ((props.hydropathy + 4.5) / 9.0).clamp(0.0, 1.0);
    blend((60, 90, 220), (220, 50, 50), t)
}

/// Same thresholds as the position panel's conservation levels
fn conservation_color(conservation: f64) -> Color32 {
    let fraction = conservation / 100.0;
    if fraction >= 0.9 {
        Color32::from_rgb(0, 180, 0)
    } else if fraction >= 0.7 {
        Color32::from_rgb(150, 180, 0)
    } else if fraction >= 0.5 {
        Color32::from_rgb(255, 165, 0)
    } else {
        Color32::from_rgb(235, 235, 235)
    }
}

fn nucleotide(r: u8) -> Color32 {
    match r {
        b'A' => Color32::from_rgb(100, 200, 100),
        b'T' | b'U' => Color32::from_rgb(220, 80, 80),
        b'G' => Color32::from_rgb(255, 200, 60),
        b'C' => Color32::from_rgb(100, 150, 255),
        _ => Color32::GRAY,
    }
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> Color32 {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t) as u8;
    Color32::from_rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// RGB triple from feature styles
pub fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaps_use_background() {
        for scheme in ColorScheme::ALL {
            assert_eq!(residue_color(scheme, b'-', 100.0), BACKGROUND);
            assert_eq!(residue_color(scheme, b'.', 0.0), BACKGROUND);
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(
            residue_color(ColorScheme::Clustal2, b'k', 0.0),
            residue_color(ColorScheme::Clustal2, b'K', 0.0)
        );
    }

    #[test]
    fn test_hydrophobicity_extremes() {
        assert_eq!(
            residue_color(ColorScheme::Hydrophobicity, b'I', 0.0),
            Color32::from_rgb(220, 50, 50)
        );
        assert_eq!(
            residue_color(ColorScheme::Hydrophobicity, b'R', 0.0),
            Color32::from_rgb(60, 90, 220)
        );
    }

    #[test]
    fn test_conservation_scheme_follows_score() {
        let high = residue_color(ColorScheme::Conservation, b'A', 100.0);
        let low = residue_color(ColorScheme::Conservation, b'A', 10.0);
        assert_ne!(high, low);
        assert_eq!(high, residue_color(ColorScheme::Conservation, b'W', 95.0));
    }

    #[test]
    fn test_scheme_names_parse() {
        let scheme: ColorScheme = serde_json::from_str("\"hydro\"").unwrap();
        assert_eq!(scheme, ColorScheme::Hydrophobicity);
        let scheme: ColorScheme = serde_json::from_str("\"clustal2\"").unwrap();
        assert_eq!(scheme, ColorScheme::Clustal2);
    }
}
