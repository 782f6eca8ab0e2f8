use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::storage::CommentRecord;

const ANONYMOUS: &str = "Anonymous";

/// 评论作者信息，缺失的名字统一显示为 `Anonymous`
#[derive(Debug, Serialize)]
pub struct CommentAuthor {
    pub id: Option<Uuid>,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// 评论树节点
#[derive(Debug, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub like_count: i32,
    pub author: CommentAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 直接回复，按创建顺序排列
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn new(record: CommentRecord, replies: Vec<CommentNode>) -> Self {
        Self {
            id: record.id,
            post_id: record.post_id,
            parent_id: record.parent_id,
            content: record.content,
            like_count: record.like_count,
            author: CommentAuthor {
                id: record.author_id,
                name: record
                    .author_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| ANONYMOUS.to_string()),
                avatar_url: record.author_avatar_url,
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
            replies,
        }
    }

    /// 当前节点及其所有后代的数量
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }
}

impl From<CommentRecord> for CommentNode {
    fn from(record: CommentRecord) -> Self {
        CommentNode::new(record, Vec::new())
    }
}

/// 将按创建时间排序的扁平评论列表组装为评论树。
///
/// - 回复挂在其真实父评论下，层级不限
/// - 父评论不存在（或排在自身之后）的评论提升为根评论
///
/// 每条输入评论在结果中恰好出现一次。
pub fn build_thread(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let index: HashMap<Uuid, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id, i))
        .collect();

    let mut children = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();

    for (i, record) in records.iter().enumerate() {
        match record.parent_id.and_then(|p| index.get(&p).copied()) {
            // 只接受更早出现的父节点，避免环
            Some(parent) if parent < i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    // 子节点下标总是大于父节点，逆序构建即可保证子树先完成
    let mut nodes: Vec<Option<CommentNode>> = (0..records.len()).map(|_| None).collect();
    for (i, record) in records.into_iter().enumerate().rev() {
        let replies = children[i]
            .iter()
            .filter_map(|&child| nodes[child].take())
            .collect();
        nodes[i] = Some(CommentNode::new(record, replies));
    }

    roots
        .into_iter()
        .filter_map(|root| nodes[root].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: u128, parent: Option<u128>, minutes: i64) -> CommentRecord {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("时间无效")
            + Duration::minutes(minutes);
        CommentRecord {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(999),
            parent_id: parent.map(Uuid::from_u128),
            author_id: Some(Uuid::from_u128(500)),
            author_name: Some(format!("user-{id}")),
            author_avatar_url: None,
            content: format!("comment {id}"),
            like_count: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn total(forest: &[CommentNode]) -> usize {
        forest.iter().map(CommentNode::size).sum()
    }

    #[test]
    fn test_flat_comments_are_all_roots() {
        let forest = build_thread(vec![record(1, None, 0), record(2, None, 1)]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].id, Uuid::from_u128(1));
        assert_eq!(forest[1].id, Uuid::from_u128(2));
        assert!(forest.iter().all(|n| n.replies.is_empty()));
    }

    #[test]
    fn test_replies_keep_creation_order() {
        let forest = build_thread(vec![
            record(1, None, 0),
            record(2, Some(1), 1),
            record(3, None, 2),
            record(4, Some(1), 3),
        ]);

        assert_eq!(forest.len(), 2);
        let replies: Vec<_> = forest[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(replies, vec![Uuid::from_u128(2), Uuid::from_u128(4)]);
        assert_eq!(total(&forest), 4);
    }

    #[test]
    fn test_reply_to_reply_nests_under_its_parent() {
        let forest = build_thread(vec![
            record(1, None, 0),
            record(2, Some(1), 1),
            record(3, Some(2), 2),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].replies.len(), 1);
        assert_eq!(forest[0].replies[0].replies[0].id, Uuid::from_u128(3));
        assert_eq!(total(&forest), 3);
    }

    #[test]
    fn test_unresolved_parent_is_promoted_to_root() {
        let forest = build_thread(vec![record(1, None, 0), record(2, Some(404), 1)]);

        assert_eq!(forest.len(), 2, "孤立的回复应提升为根评论");
        assert_eq!(forest[1].id, Uuid::from_u128(2));
        assert_eq!(total(&forest), 2);
    }

    #[test]
    fn test_parent_listed_later_does_not_create_cycle() {
        let forest = build_thread(vec![record(1, Some(2), 0), record(2, Some(1), 1)]);
        assert_eq!(total(&forest), 2, "每条评论恰好出现一次");
    }

    #[test]
    fn test_missing_author_defaults_to_anonymous() {
        let mut anon = record(1, None, 0);
        anon.author_name = None;
        let mut blank = record(2, None, 1);
        blank.author_name = Some("  ".to_string());

        let forest = build_thread(vec![anon, blank]);
        assert_eq!(forest[0].author.name, "Anonymous");
        assert_eq!(forest[1].author.name, "Anonymous");
    }

    #[test]
    fn test_empty_input() {
        assert!(build_thread(Vec::new()).is_empty());
    }
}
