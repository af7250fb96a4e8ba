/// What the renderer produces. Argument building and execution are the same
/// for both; only the binary, suffix and content type differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputKind {
    #[default]
    Pdf,
    /// JPEG image (the format follows the output suffix).
    Image,
}
impl OutputKind {
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Image => "image/jpeg",
        }
    }

    /// Suffix of the temporary output file, including the dot.
    #[inline]
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Image => ".jpg",
        }
    }

    #[inline]
    #[must_use]
    pub fn default_binary(&self) -> &'static str {
        match self {
            Self::Pdf => "wkhtmltopdf",
            Self::Image => "wkhtmltoimage",
        }
    }
}
