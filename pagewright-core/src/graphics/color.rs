/// Represents a color in PDF documents.
///
/// Supports RGB, Grayscale, and CMYK color spaces. Components are stored as
/// fractions in 0.0-1.0; the `*8` constructors take the usual 0-255 values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// RGB color (red, green, blue) with values from 0.0 to 1.0
    Rgb(f64, f64, f64),
    /// Grayscale color with value from 0.0 (black) to 1.0 (white)
    Gray(f64),
    /// CMYK color (cyan, magenta, yellow, key/black) with values from 0.0 to 1.0
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    /// Creates an RGB color with values clamped to 0.0-1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Creates a grayscale color with value clamped to 0.0-1.0.
    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    /// Creates a CMYK color with values clamped to 0.0-1.0.
    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    /// RGB from 0-255 components. Pure black collapses to gray so that it
    /// compares equal to the document default.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        if r == 0 && g == 0 && b == 0 {
            return Color::Gray(0.0);
        }
        Color::Rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Gray level from 0 (black) to 255 (white).
    pub fn gray8(value: u8) -> Self {
        Color::Gray(value as f64 / 255.0)
    }

    /// Black color (gray 0.0).
    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    /// White color (gray 1.0).
    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    /// Content-stream operator selecting this color for strokes.
    pub fn stroke_operator(&self) -> String {
        match self {
            Color::Gray(g) => format!("{g:.3} G"),
            Color::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} RG"),
            Color::Cmyk(c, m, y, k) => format!("{c:.3} {m:.3} {y:.3} {k:.3} K"),
        }
    }

    /// Content-stream operator selecting this color for fills and text.
    pub fn fill_operator(&self) -> String {
        match self {
            Color::Gray(g) => format!("{g:.3} g"),
            Color::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} rg"),
            Color::Cmyk(c, m, y, k) => format!("{c:.3} {m:.3} {y:.3} {k:.3} k"),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        assert_eq!(Color::rgb(1.5, -0.5, 0.5), Color::Rgb(1.0, 0.0, 0.5));
        assert_eq!(Color::gray(2.0), Color::Gray(1.0));
    }

    #[test]
    fn test_rgb8_black_is_gray() {
        assert_eq!(Color::rgb8(0, 0, 0), Color::black());
        assert_eq!(Color::rgb8(255, 0, 0), Color::Rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_operators() {
        assert_eq!(Color::black().stroke_operator(), "0.000 G");
        assert_eq!(Color::black().fill_operator(), "0.000 g");
        assert_eq!(
            Color::rgb8(255, 0, 0).fill_operator(),
            "1.000 0.000 0.000 rg"
        );
        assert_eq!(
            Color::rgb8(0, 0, 255).stroke_operator(),
            "0.000 0.000 1.000 RG"
        );
        assert_eq!(
            Color::cmyk(0.0, 1.0, 0.0, 0.0).fill_operator(),
            "0.000 1.000 0.000 0.000 k"
        );
        assert_eq!(Color::gray8(51).fill_operator(), "0.200 g");
    }
}
