mod catalog;
mod quiz;
mod search;
mod slug;
mod thread;
mod toggle;

pub use self::{
    catalog::{Catalog, CatalogEntry},
    quiz::{QuizSubmission, QuizType},
    search::{
        HitKind, MAX_LIMIT, SearchCategory, SearchHit, clamp_limit, like_pattern, normalize_term,
        rank, suggestions,
    },
    slug::{new_slug, slugify},
    thread::{CommentAuthor, CommentNode, build_thread},
    toggle::{LikeAction, LikeTarget, SaveAction, ToggleAction},
};
