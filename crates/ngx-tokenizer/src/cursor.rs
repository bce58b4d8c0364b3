use text_size::TextSize;

pub(crate) const EOF_CHAR: char = '\0';

/// Character cursor over the source with byte-offset bookkeeping.
///
/// `EOF_CHAR` is only a placeholder returned past the end; a literal NUL in
/// the input is ordinary text, so end of input is always checked with
/// [`Cursor::is_eof`].
#[derive(Clone)]
pub(crate) struct Cursor<'t> {
    text: &'t str,
    pos: usize,
    token_start: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(text: &'t str, pos: TextSize) -> Self {
        let pos = usize::from(pos);
        Self { text, pos, token_start: pos }
    }

    pub(crate) fn offset(&self) -> TextSize {
        TextSize::new(self.pos as u32)
    }

    pub(crate) fn pos_within_token(&self) -> TextSize {
        TextSize::new((self.pos - self.token_start) as u32)
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.token_start = self.pos;
    }

    /// Text consumed since the last reset.
    pub(crate) fn token_text(&self) -> &'t str {
        &self.text[self.token_start..self.pos]
    }

    pub(crate) fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn advance(&mut self) -> char {
        match self.rest().chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                c
            }
            None => EOF_CHAR,
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    /// Moves back to `offset`, which must not precede the token start.
    pub(crate) fn rewind_to(&mut self, offset: usize) {
        debug_assert!(offset >= self.token_start && offset <= self.pos);
        self.pos = offset;
    }

    pub(crate) fn token_start(&self) -> usize {
        self.token_start
    }
}
