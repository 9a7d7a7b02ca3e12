use serde::{Deserialize, Serialize};

/// What the favorite indicator of a story shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FavoriteMark {
    #[default]
    NotFavorited,
    Favorited,
}

impl FavoriteMark {
    pub fn toggled(self) -> Self {
        match self {
            Self::NotFavorited => Self::Favorited,
            Self::Favorited => Self::NotFavorited,
        }
    }

    pub fn is_favorited(self) -> bool {
        matches!(self, Self::Favorited)
    }
}

/// Per-story favorite state for the current session.
///
/// `Pending` is entered at click time and shows `to` until the remote call
/// resolves, after which the state settles on `to` (success) or rolls back
/// to `from` (failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteState {
    #[default]
    NotFavorited,
    Favorited,
    Pending { from: FavoriteMark, to: FavoriteMark },
}

impl FavoriteState {
    pub fn settled(mark: FavoriteMark) -> Self {
        match mark {
            FavoriteMark::NotFavorited => Self::NotFavorited,
            FavoriteMark::Favorited => Self::Favorited,
        }
    }

    /// The mark to render for this state.
    pub fn indicator(self) -> FavoriteMark {
        match self {
            Self::NotFavorited => FavoriteMark::NotFavorited,
            Self::Favorited => FavoriteMark::Favorited,
            Self::Pending { to, .. } => to,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
