use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// 内存中最多保留的审计记录条数
pub const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    /// 操作者，通常是用户 id 或邮箱
    pub actor: String,
    pub action: String,
    pub detail: Value,
}

/// 审计日志
pub trait AuditSink: Send + Sync + 'static {
    fn record(&self, actor: &str, action: &str, detail: Value);

    /// 最近的记录，新的在前
    fn recent(&self, limit: usize) -> Vec<AuditEntry>;
}

pub type DynAudit = Arc<dyn AuditSink>;

/// 进程内环形缓冲区，重启后丢失
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<VecDeque<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, actor: &str, action: &str, detail: Value) {
        tracing::info!(actor, action, %detail, "audit");

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(AuditEntry {
            at: Utc::now(),
            actor: actor.to_string(),
            action: action.to_string(),
            detail,
        });
    }

    fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recent_newest_first() {
        let sink = MemoryAuditSink::new();
        sink.record("a@example.com", "first", json!({}));
        sink.record("a@example.com", "second", json!({ "n": 2 }));

        let recent = sink.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "second");
        assert_eq!(recent[0].detail["n"], 2);
        assert_eq!(recent[1].action, "first");

        assert_eq!(sink.recent(1).len(), 1);
    }

    #[test]
    fn test_ring_buffer_capped() {
        let sink = MemoryAuditSink::new();
        for i in 0..MAX_ENTRIES + 5 {
            sink.record("system", &format!("action-{i}"), Value::Null);
        }

        let recent = sink.recent(usize::MAX);
        assert_eq!(recent.len(), MAX_ENTRIES, "超出容量的旧记录应被丢弃");
        assert_eq!(recent[0].action, format!("action-{}", MAX_ENTRIES + 4));
        assert_eq!(recent[MAX_ENTRIES - 1].action, "action-5");
    }
}
