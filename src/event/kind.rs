//! 事件类型枚举

/// 已建模的事件类型（对应 `GITHUB_EVENT_NAME`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Push,
    PullRequest,
    PullRequestReviewComment,
    PullRequestReview,
    Delete,
    Create,
    Issues,
    IssueComment,
    Fork,
    Release,
    Watch,
}

impl EventKind {
    /// 全部已建模类型
    pub const ALL: [EventKind; 11] = [
        EventKind::Push,
        EventKind::PullRequest,
        EventKind::PullRequestReviewComment,
        EventKind::PullRequestReview,
        EventKind::Delete,
        EventKind::Create,
        EventKind::Issues,
        EventKind::IssueComment,
        EventKind::Fork,
        EventKind::Release,
        EventKind::Watch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::PullRequestReviewComment => "pull_request_review_comment",
            EventKind::PullRequestReview => "pull_request_review",
            EventKind::Delete => "delete",
            EventKind::Create => "create",
            EventKind::Issues => "issues",
            EventKind::IssueComment => "issue_comment",
            EventKind::Fork => "fork",
            EventKind::Release => "release",
            EventKind::Watch => "watch",
        }
    }

    /// 解析事件名（大小写不敏感）；未建模的类型返回 `None`
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 标题中的类型名：小写，`_` 换成空格，首字母大写
///
/// `pull_request` -> `Pull request`，`UNKNOWN_KIND` -> `Unknown kind`
pub fn display_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace('_', " ");
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
