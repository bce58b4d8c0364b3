use crate::SyntaxKind;

const _: () = assert!((SyntaxKind::TOMBSTONE as u8) < u64::BITS as u8);

/// Set of [`SyntaxKind`]s stored as a bitmask; usable in `const` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet(u64);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    const fn bit(kind: SyntaxKind) -> u64 {
        1 << kind as u8
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < N {
            bits |= Self::bit(kinds[i]);
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn with(self, kind: SyntaxKind) -> Self {
        Self(self.0 | Self::bit(kind))
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
