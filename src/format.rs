//! Provider markup dialects.

/// Independent formatting toggles for [`Markup::format`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub code: bool,
    pub bold: bool,
    pub italics: bool,
    pub strikethrough: bool,
}

impl FormatOptions {
    pub const BOLD: Self = Self {
        code: false,
        bold: true,
        italics: false,
        strikethrough: false,
    };

    #[must_use]
    pub const fn code(mut self) -> Self {
        self.code = true;
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn italics(mut self) -> Self {
        self.italics = true;
        self
    }

    #[must_use]
    pub const fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }
}

/// Delimiter wrapped around both sides of the text for each toggle.
#[derive(Debug, Clone, Copy)]
pub struct Delimiters {
    pub code: &'static str,
    pub bold: &'static str,
    pub italics: &'static str,
    pub strikethrough: &'static str,
}

pub trait Markup {
    const DELIMITERS: Delimiters;

    /// Wraps `text` in code, then bold, then italics, then strikethrough
    /// delimiters. `None` means bold only; `Some(FormatOptions::default())`
    /// returns the text unchanged.
    fn format(text: &str, options: Option<FormatOptions>) -> String {
        let options = options.unwrap_or(FormatOptions::BOLD);
        let d = Self::DELIMITERS;
        let mut out = text.to_string();

        if options.code {
            out = wrap(&out, d.code);
        }
        if options.bold {
            out = wrap(&out, d.bold);
        }
        if options.italics {
            out = wrap(&out, d.italics);
        }
        if options.strikethrough {
            out = wrap(&out, d.strikethrough);
        }
        out
    }

    fn format_url(url: &str, text: &str) -> String;
}

fn wrap(text: &str, delimiter: &str) -> String {
    format!("{delimiter}{text}{delimiter}")
}
