use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// 开关类关系（点赞、收藏）的目标状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// 根据当前状态翻转
    Toggle,
    /// 确保关系存在
    On,
    /// 确保关系不存在
    Off,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
    #[default]
    Toggle,
}

impl From<LikeAction> for ToggleAction {
    fn from(action: LikeAction) -> Self {
        match action {
            LikeAction::Like => ToggleAction::On,
            LikeAction::Unlike => ToggleAction::Off,
            LikeAction::Toggle => ToggleAction::Toggle,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Save,
    Unsave,
    #[default]
    Toggle,
}

impl From<SaveAction> for ToggleAction {
    fn from(action: SaveAction) -> Self {
        match action {
            SaveAction::Save => ToggleAction::On,
            SaveAction::Unsave => ToggleAction::Off,
            SaveAction::Toggle => ToggleAction::Toggle,
        }
    }
}

/// 点赞目标，文章与评论二选一
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl LikeTarget {
    pub fn from_ids(post_id: Option<Uuid>, comment_id: Option<Uuid>) -> Result<Self, ApiError> {
        match (post_id, comment_id) {
            (Some(id), None) => Ok(LikeTarget::Post(id)),
            (None, Some(id)) => Ok(LikeTarget::Comment(id)),
            (Some(_), Some(_)) => Err(ApiError::invalid(
                "Provide either post_id or comment_id, not both",
            )),
            (None, None) => Err(ApiError::invalid("post_id or comment_id is required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_map_to_toggle_action() {
        assert_eq!(ToggleAction::from(LikeAction::Like), ToggleAction::On);
        assert_eq!(ToggleAction::from(LikeAction::Unlike), ToggleAction::Off);
        assert_eq!(ToggleAction::from(SaveAction::Save), ToggleAction::On);
        assert_eq!(ToggleAction::from(SaveAction::Unsave), ToggleAction::Off);
        assert_eq!(ToggleAction::from(SaveAction::default()), ToggleAction::Toggle);
    }

    #[test]
    fn test_action_deserialize() {
        let action: LikeAction = serde_json::from_str("\"unlike\"").expect("反序列化失败");
        assert!(matches!(action, LikeAction::Unlike));
        assert!(serde_json::from_str::<LikeAction>("\"save\"").is_err());
    }

    #[test]
    fn test_like_target_requires_exactly_one_id() {
        let id = Uuid::from_u128(1);
        assert_eq!(LikeTarget::from_ids(Some(id), None).ok(), Some(LikeTarget::Post(id)));
        assert_eq!(
            LikeTarget::from_ids(None, Some(id)).ok(),
            Some(LikeTarget::Comment(id))
        );
        assert!(LikeTarget::from_ids(Some(id), Some(id)).is_err());
        assert!(LikeTarget::from_ids(None, None).is_err());
    }
}
