use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use rand::Rng;

/// 验证码有效期
pub const CODE_TTL: Duration = Duration::from_secs(10 * 60);
/// 允许的最大错误次数，超过后验证码作废
pub const MAX_ATTEMPTS: u32 = 5;
/// 同一邮箱两次申请之间的最短间隔
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

struct PendingCode {
    code: String,
    expires_at: Instant,
    attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    Mismatch,
    Expired,
    /// 没有待验证的验证码（从未发送、已使用或已作废）
    Missing,
}

#[derive(Default)]
struct Codes {
    pending: HashMap<String, PendingCode>,
    /// 最近一次发放时间，验证码作废后仍保留到冷却结束
    issued_at: HashMap<String, Instant>,
}

/// 管理员邮箱验证码，保存在进程内存中
///
/// 同一邮箱重新申请会覆盖旧验证码，但两次申请至少间隔 `cooldown`；
/// 验证成功后立即作废。
pub struct VerificationCodes {
    ttl: Duration,
    cooldown: Duration,
    codes: Mutex<Codes>,
}

impl Default for VerificationCodes {
    fn default() -> Self {
        Self::new(CODE_TTL, RESEND_COOLDOWN)
    }
}

impl VerificationCodes {
    pub fn new(ttl: Duration, cooldown: Duration) -> Self {
        Self {
            ttl,
            cooldown,
            codes: Mutex::new(Codes::default()),
        }
    }

    /// 为邮箱生成新的 6 位验证码，冷却期内返回 `None`
    pub fn issue(&self, email: &str) -> Option<String> {
        let key = email.trim().to_lowercase();
        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let cooldown = self.cooldown;
        codes.pending.retain(|_, p| p.expires_at > now);
        codes
            .issued_at
            .retain(|_, at| now.duration_since(*at) < cooldown);
        if codes.issued_at.contains_key(&key) {
            return None;
        }

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
        codes.issued_at.insert(key.clone(), now);
        codes.pending.insert(
            key,
            PendingCode {
                code: code.clone(),
                expires_at: now + self.ttl,
                attempts: 0,
            },
        );
        Some(code)
    }

    pub fn verify(&self, email: &str, code: &str) -> CodeCheck {
        let key = email.trim().to_lowercase();
        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        let pending = &mut codes.pending;

        let Some(entry) = pending.get_mut(&key) else {
            return CodeCheck::Missing;
        };

        if Instant::now() >= entry.expires_at {
            pending.remove(&key);
            return CodeCheck::Expired;
        }

        if entry.code == code.trim() {
            pending.remove(&key);
            return CodeCheck::Valid;
        }

        entry.attempts += 1;
        if entry.attempts >= MAX_ATTEMPTS {
            pending.remove(&key);
        }
        CodeCheck::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_once() {
        let codes = VerificationCodes::default();
        let code = codes.issue("Admin@Example.com").expect("首次申请应成功");

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(codes.verify("admin@example.com", &code), CodeCheck::Valid);
        assert_eq!(
            codes.verify("admin@example.com", &code),
            CodeCheck::Missing,
            "验证码只能使用一次"
        );
    }

    #[test]
    fn test_too_many_attempts_invalidates() {
        let codes = VerificationCodes::default();
        let code = codes.issue("admin@example.com").expect("首次申请应成功");
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..MAX_ATTEMPTS {
            assert_eq!(codes.verify("admin@example.com", wrong), CodeCheck::Mismatch);
        }
        assert_eq!(codes.verify("admin@example.com", &code), CodeCheck::Missing);
    }

    #[test]
    fn test_expired_code() {
        let codes = VerificationCodes::new(Duration::ZERO, RESEND_COOLDOWN);
        let code = codes.issue("admin@example.com").expect("首次申请应成功");
        assert_eq!(codes.verify("admin@example.com", &code), CodeCheck::Expired);
    }

    #[test]
    fn test_reissue_replaces_code() {
        let codes = VerificationCodes::new(CODE_TTL, Duration::ZERO);
        let first = codes.issue("admin@example.com").expect("首次申请应成功");
        let second = codes.issue("admin@example.com").expect("没有冷却时应可重新申请");

        if first != second {
            assert_eq!(codes.verify("admin@example.com", &first), CodeCheck::Mismatch);
        }
        assert_eq!(codes.verify("admin@example.com", &second), CodeCheck::Valid);
    }

    #[test]
    fn test_reissue_cooldown() {
        let codes = VerificationCodes::default();
        let code = codes.issue("admin@example.com").expect("首次申请应成功");
        assert!(codes.issue("ADMIN@example.com").is_none(), "冷却期内不能重新申请");

        let wrong = if code == "000000" { "111111" } else { "000000" };
        for _ in 0..MAX_ATTEMPTS {
            codes.verify("admin@example.com", wrong);
        }
        assert!(
            codes.issue("admin@example.com").is_none(),
            "验证码作废后冷却仍然有效"
        );
        assert!(codes.issue("other@example.com").is_some(), "冷却按邮箱区分");
    }
}
