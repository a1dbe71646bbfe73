//! Exponential format templates
//!
//! The only string-building primitive available in the alphabet is Python's
//! `%` operator applied to one argument at a time:
//!
//! ```text
//! '%c%%c%%%%c' % a % b % c
//! ```
//!
//! Each application consumes the leftmost live placeholder and halves every
//! run of escaped percents (`%%` becomes `%`). For the i-th placeholder to be
//! live exactly when the i-th argument arrives it must be preceded by 2^i
//! percent symbols, so a template for L arguments is 2^L - 1 + L symbols
//! long. Templates therefore only ever cover a handful of arguments: the
//! binary digits of one integer, or the characters of one short opcode.
//!
//! A literal `%` in the output cannot be produced through a placeholder,
//! because the next application would parse it. Instead it is written as a
//! run of 2^T percents, where T is the number of applications still to come,
//! and is halved down to a single `%` by the last one.
//!
//! Python's own semantics are assumed, not Rust's `format!`: only `%%`,
//! `%x` (lowercase hexadecimal of an int or bool) and `%c` (character of an
//! int, or a one-character string) ever appear.

/// Conversion used by every placeholder in one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `%x`: hexadecimal, so `True` gives `1`, `False` gives `0` and eleven
    /// gives `b`.
    Hex,
    /// `%c`: the character with the argument's code point.
    Char,
}

impl Placeholder {
    /// The conversion letter, itself one of the eight symbols.
    pub fn symbol(self) -> char {
        match self {
            Placeholder::Hex => 'x',
            Placeholder::Char => 'c',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Slot,
    Percent,
}

/// A template under construction.
#[derive(Debug, Clone)]
pub struct FormatTemplate {
    placeholder: Placeholder,
    segments: Vec<Segment>,
}

impl FormatTemplate {
    pub fn new(placeholder: Placeholder) -> Self {
        FormatTemplate {
            placeholder,
            segments: Vec::new(),
        }
    }

    /// A template of `len` consecutive placeholders.
    pub fn with_slots(placeholder: Placeholder, len: usize) -> Self {
        FormatTemplate {
            placeholder,
            segments: vec![Segment::Slot; len],
        }
    }

    /// Append a placeholder that consumes the next argument.
    pub fn push_slot(&mut self) -> &mut Self {
        self.segments.push(Segment::Slot);
        self
    }

    /// Append a `%` that survives every application.
    pub fn push_percent(&mut self) -> &mut Self {
        self.segments.push(Segment::Percent);
        self
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Number of arguments the template consumes.
    pub fn slots(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| **s == Segment::Slot)
            .count()
    }

    /// Length of the rendered template, or `None` if it does not fit in
    /// memory addressing.
    pub fn rendered_len(&self) -> Option<usize> {
        let total = u32::try_from(self.slots()).ok()?;
        let literal_run = 1usize.checked_shl(total)?;
        let mut len = 0usize;
        let mut slot = 0u32;
        for segment in &self.segments {
            let run = match segment {
                Segment::Slot => {
                    let run = 1usize.checked_shl(slot)?.checked_add(1)?;
                    slot += 1;
                    run
                }
                Segment::Percent => literal_run,
            };
            len = len.checked_add(run)?;
        }
        Some(len)
    }

    /// Render the template text.
    ///
    /// Callers are expected to bound [`slots`](Self::slots) first; the
    /// output doubles with every placeholder.
    pub fn render(&self) -> String {
        let total = self.slots() as u32;
        let symbol = self.placeholder.symbol();
        let mut out = String::with_capacity(self.rendered_len().unwrap_or(0));
        let mut slot = 0u32;
        for segment in &self.segments {
            match segment {
                Segment::Slot => {
                    push_percents(&mut out, 1usize << slot);
                    out.push(symbol);
                    slot += 1;
                }
                Segment::Percent => push_percents(&mut out, 1usize << total),
            }
        }
        out
    }
}

fn push_percents(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n('%', count));
}

/// The plain `%P%%P%%%%P…` template with `len` placeholders.
pub fn format_template(placeholder: Placeholder, len: usize) -> String {
    FormatTemplate::with_slots(placeholder, len).render()
}
