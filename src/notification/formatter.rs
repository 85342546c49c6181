//! 消息格式化模块 - 将 GitHub 事件渲染为 Mattermost 通知
//!
//! 主要功能：
//! - 通用标题行：`{Kind} {action} by [login](url) in [repo](url)`
//! - 每种事件类型一个 handler，生成附件正文、颜色、缩略图
//! - 未建模的事件类型走默认 handler，保证任何事件都能渲染
//!
//! 设计原则：
//! 1. 纯函数 - 同一输入渲染结果逐字节一致（watch 的资料补充除外）
//! 2. 缺失即省略 - 可选字段缺失只会少一段文本，不会失败
//! 3. 显式分发 - `HANDLERS` 表列出全部已建模类型

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::payload::{Attachment, Props, RenderedNotification};
use super::profile::ProfileLookup;
use crate::event::{display_name, EventEnvelope, EventKind, Facet};

/// 颜色和缩略图
pub mod style {
    pub const PR_COLOR: &str = "#32CD32";
    pub const PUSH_COLOR: &str = "#708090";
    pub const ISSUE_COLOR: &str = "#FFA500";
    pub const RELEASE_COLOR: &str = "#DB7093";
    pub const DEFAULT_COLOR: &str = "#FFFFFF";
    pub const WATCH_COLOR: &str = "#FFD700";

    pub const PR_THUMBNAIL: &str = "https://github.com/openziti/branding/blob/main/images/ziggy/closeups/Ziggy-Chef-Closeup.png?raw=true";
    pub const PR_APPROVED_THUMBNAIL: &str = "https://github.com/openziti/branding/blob/main/images/ziggy/closeups/Ziggy-Dabbing.png?raw=true";
    pub const ISSUE_THUMBNAIL: &str = "https://github.com/openziti/branding/blob/main/images/ziggy/closeups/Ziggy-has-an-Idea-Closeup.png?raw=true";
    pub const RELEASE_THUMBNAIL: &str = "https://github.com/openziti/branding/blob/main/images/ziggy/closeups/Ziggy-Parties-Closeup.png?raw=true";
    pub const WATCH_THUMBNAIL: &str = "https://github.com/openziti/branding/blob/main/images/ziggy/closeups/Ziggy-is-Star-Struck.png?raw=true";

    /// 统计徽章服务
    pub const STATS_BADGE_URL: &str = "https://github-readme-stats.vercel.app/api";
}

/// 渲染上下文，传给各 handler
pub struct RenderContext<'a> {
    pub env: &'a EventEnvelope,
    /// 标题行
    pub title: &'a str,
    /// 标题中的类型名（如 `Pull request`）
    pub kind_label: &'a str,
    profiles: Option<&'a dyn ProfileLookup>,
}

/// 事件 handler：生成附件
pub type Handler = fn(&RenderContext<'_>) -> Attachment;

/// 事件类型 -> handler
const HANDLERS: &[(EventKind, Handler)] = &[
    (EventKind::Push, render_push),
    (EventKind::PullRequest, render_pull_request),
    (EventKind::PullRequestReviewComment, render_review_comment),
    (EventKind::PullRequestReview, render_review),
    (EventKind::Delete, render_delete),
    (EventKind::Create, render_create),
    (EventKind::Issues, render_issues),
    (EventKind::IssueComment, render_issue_comment),
    (EventKind::Fork, render_fork),
    (EventKind::Release, render_release),
    (EventKind::Watch, render_watch),
];

/// 查找 handler；未建模类型返回默认 handler
pub fn handler_for(kind: Option<EventKind>) -> Handler {
    kind.and_then(|k| HANDLERS.iter().find(|(hk, _)| *hk == k).map(|(_, h)| *h))
        .unwrap_or(render_default)
}

/// 通知渲染器
#[derive(Default)]
pub struct NotificationRenderer {
    profiles: Option<Arc<dyn ProfileLookup>>,
    username: Option<String>,
    icon_url: Option<String>,
}

impl NotificationRenderer {
    /// 创建渲染器（不做资料补充）
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置资料查询（watch 事件使用）
    pub fn with_profile_lookup(mut self, lookup: Arc<dyn ProfileLookup>) -> Self {
        self.profiles = Some(lookup);
        self
    }

    /// 覆盖显示用户名（空字符串视为未设置）
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username.filter(|s| !s.is_empty());
        self
    }

    /// 覆盖头像（空字符串视为未设置）
    pub fn with_icon_url(mut self, icon_url: Option<String>) -> Self {
        self.icon_url = icon_url.filter(|s| !s.is_empty());
        self
    }

    /// 渲染事件
    pub fn render(&self, kind_name: &str, env: &EventEnvelope) -> RenderedNotification {
        let kind = EventKind::parse(kind_name);
        let kind_label = display_name(kind_name);

        let mut title = title_line(&kind_label, env);
        if kind == Some(EventKind::Watch) {
            title.push_str(" #stargazer");
        }

        info!(
            kind = %kind_name,
            modeled = kind.is_some(),
            action = env.action().unwrap_or(""),
            repo = %env.repository.full_name,
            "Rendering notification"
        );

        let ctx = RenderContext {
            env,
            title: &title,
            kind_label: &kind_label,
            profiles: self.profiles.as_deref(),
        };
        let attachment = handler_for(kind)(&ctx);

        RenderedNotification {
            username: self
                .username
                .clone()
                .unwrap_or_else(|| env.sender.login.clone()),
            icon_url: self
                .icon_url
                .clone()
                .unwrap_or_else(|| env.sender.avatar_url.clone()),
            text: title,
            props: Props::card_for(env.raw()),
            attachment,
        }
    }
}

/// 通用标题行
pub fn title_line(kind_label: &str, env: &EventEnvelope) -> String {
    let action = env
        .action()
        .map(|a| format!(" {}", a))
        .unwrap_or_default();

    format!(
        "{}{} by {} in {}",
        kind_label,
        action,
        link(&env.sender.login, &env.sender.html_url),
        link(&env.repository.full_name, &env.repository.html_url)
    )
}

fn link(label: &str, url: &str) -> String {
    format!("[{}]({})", label, url)
}

/// `[PR#7: title](url)` / `[Issue#7: title](url)`
fn numbered_link(prefix: &str, item: Facet<'_>, url: &str) -> String {
    let label = format!(
        "{}#{}: {}",
        prefix,
        item.scalar("number").unwrap_or_default(),
        item.str("title").unwrap_or_default()
    );
    link(&label, url)
}

/// 用户/团队列表，逗号分隔；为空时返回 `None`
fn people_list<'a>(entries: impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>) -> Option<String> {
    let links: Vec<String> = entries
        .map(|(name, url)| link(name.unwrap_or_default(), url.unwrap_or_default()))
        .collect();
    if links.is_empty() {
        None
    } else {
        Some(links.join(", "))
    }
}

/// 首字母大写，其余小写
fn capitalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_push(ctx: &RenderContext<'_>) -> Attachment {
    let root = ctx.env.root();
    let commits: Vec<Facet<'_>> = root.items("commits").collect();

    let verb = if root.flag("forced") { "Force-pushed" } else { "Pushed" };
    let mut body = format!(
        "{} {} to {}",
        verb,
        link(
            &format!("{} commit(s)", commits.len()),
            root.str("compare").unwrap_or_default()
        ),
        root.str("ref").unwrap_or_default()
    );

    for commit in &commits {
        let short_sha: String = commit.str("id").unwrap_or_default().chars().take(6).collect();
        body.push_str(&format!(
            "\n{} {}",
            link(&format!("`{}`", short_sha), commit.str("url").unwrap_or_default()),
            commit.str("message").unwrap_or_default()
        ));
    }

    Attachment::new(body).with_color(style::PUSH_COLOR)
}

fn render_pull_request(ctx: &RenderContext<'_>) -> Attachment {
    let pr = ctx.env.facet("pull_request");
    let mut lines = vec![
        format!(
            "Pull request {}",
            numbered_link("PR", pr, pr.str("html_url").unwrap_or_default())
        ),
        format!(
            "{} -> {}",
            pr.get("head").str("label").unwrap_or_default(),
            pr.get("base").str("label").unwrap_or_default()
        ),
    ];

    let reviewers = pr
        .items("requested_reviewers")
        .map(|r| (r.str("login"), r.str("html_url")))
        .chain(
            pr.items("requested_teams")
                .map(|t| (t.str("name"), t.str("html_url"))),
        );
    if let Some(reviewers) = people_list(reviewers) {
        lines.push(format!("Reviewer(s): {}", reviewers));
    }

    if let Some(body) = pr.text("body") {
        lines.push(body.to_string());
    }
    lines.push("#new-pull-request".to_string());

    Attachment::new(lines.join("\n"))
        .with_color(style::PR_COLOR)
        .with_thumb(style::PR_THUMBNAIL)
}

fn render_review_comment(ctx: &RenderContext<'_>) -> Attachment {
    let comment = ctx.env.facet("comment");
    let pr = ctx.env.facet("pull_request");

    let mut body = format!(
        "{} in {}:",
        link("Comment", comment.str("html_url").unwrap_or_default()),
        numbered_link("PR", pr, pr.str("html_url").unwrap_or_default())
    );
    if let Some(text) = comment.text("body") {
        body.push_str(&format!("\n{}", text));
    }

    Attachment::new(body).with_color(style::PR_COLOR)
}

fn render_review(ctx: &RenderContext<'_>) -> Attachment {
    let review = ctx.env.facet("review");
    let pr = ctx.env.facet("pull_request");
    let state = review.str("state").unwrap_or_default();

    let mut lines = vec![format!(
        "{} of {}",
        link("Review", review.str("html_url").unwrap_or_default()),
        numbered_link("PR", pr, pr.str("html_url").unwrap_or_default())
    )];
    if !state.is_empty() {
        lines.push(format!("Review State: {}", capitalize(state)));
    }
    if let Some(text) = review.text("body") {
        lines.push(text.to_string());
    }

    Attachment::new(lines.join("\n"))
        .with_color(style::PR_COLOR)
        .with_thumb_if(state == "approved", style::PR_APPROVED_THUMBNAIL)
}

fn render_delete(ctx: &RenderContext<'_>) -> Attachment {
    let root = ctx.env.root();
    Attachment::new(format!(
        "Deleted {} \"{}\"",
        root.str("ref_type").unwrap_or_default(),
        root.str("ref").unwrap_or_default()
    ))
}

fn render_create(ctx: &RenderContext<'_>) -> Attachment {
    let root = ctx.env.root();
    Attachment::new(format!(
        "Created {} \"{}\"",
        root.str("ref_type").unwrap_or_default(),
        root.str("ref").unwrap_or_default()
    ))
}

fn render_issues(ctx: &RenderContext<'_>) -> Attachment {
    let issue = ctx.env.facet("issue");
    let mut lines = vec![format!(
        "Issue {}",
        link(
            issue.str("title").unwrap_or_default(),
            issue.str("html_url").unwrap_or_default()
        )
    )];

    let assignees = issue
        .items("assignees")
        .map(|a| (a.str("login"), a.str("html_url")));
    if let Some(assignees) = people_list(assignees) {
        lines.push(format!("Assignee(s): {}", assignees));
    }

    if let Some(body) = issue.text("body") {
        lines.push(body.to_string());
    }

    let opened = matches!(ctx.env.action(), Some("created") | Some("opened"));
    Attachment::new(lines.join("\n"))
        .with_color(style::ISSUE_COLOR)
        .with_thumb_if(opened, style::ISSUE_THUMBNAIL)
}

fn render_issue_comment(ctx: &RenderContext<'_>) -> Attachment {
    let comment = ctx.env.facet("comment");
    let issue = ctx.env.facet("issue");
    let comment_url = comment.str("html_url").unwrap_or_default();

    let (prefix, color) = if issue.get("pull_request").is_present() {
        ("PR", style::PR_COLOR)
    } else {
        ("Issue", style::ISSUE_COLOR)
    };

    // 标题链接沿用评论链接，而不是 issue 自身的链接
    let mut body = format!(
        "{} on {}",
        link("Comment", comment_url),
        numbered_link(prefix, issue, comment_url)
    );
    if let Some(text) = comment.text("body") {
        body.push_str(&format!("\n{}", text));
    }

    Attachment::new(body).with_color(color)
}

fn render_fork(ctx: &RenderContext<'_>) -> Attachment {
    let forkee = ctx.env.facet("forkee");
    Attachment::new(format!(
        "Forkee {}",
        link(
            forkee.str("full_name").unwrap_or_default(),
            forkee.str("html_url").unwrap_or_default()
        )
    ))
}

fn render_release(ctx: &RenderContext<'_>) -> Attachment {
    let release = ctx.env.facet("release");

    let label = if release.flag("draft") {
        "Draft release"
    } else if release.flag("prerelease") {
        "Prerelease"
    } else {
        "Release"
    };

    let tag = release.str("tag_name").unwrap_or_default();
    let name = match release.text("name") {
        Some(name) => format!("{} ({})", name, tag),
        None => tag.to_string(),
    };

    let mut body = format!(
        "{} {}",
        label,
        link(&name, release.str("html_url").unwrap_or_default())
    );
    if let Some(text) = release.text("body") {
        body.push_str(&format!("\n{}", text));
    }

    Attachment::new(body)
        .with_color(style::RELEASE_COLOR)
        .with_thumb_if(ctx.env.action() == Some("released"), style::RELEASE_THUMBNAIL)
}

fn render_watch(ctx: &RenderContext<'_>) -> Attachment {
    let sender = &ctx.env.sender;
    let star_count = ctx
        .env
        .repository
        .stargazers_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string());

    let mut body = format!(
        "{} is stargazer number {}\n\n",
        link(&sender.login, &sender.html_url),
        star_count
    );

    match ctx.profiles {
        Some(lookup) => match lookup.lookup(sender) {
            Ok(details) => {
                for (label, value) in details.lines() {
                    // 行尾两个空格：markdown 换行
                    body.push_str(&format!("\n{}: {}  ", label, value));
                }
            }
            Err(e) => warn!(login = %sender.login, error = %e, "Failed to retrieve user info"),
        },
        None => debug!("Profile lookup disabled, skipping enrichment"),
    }

    match stats_badge(&sender.login) {
        Ok(badge) => body.push_str(&format!("\n\n{}", badge)),
        Err(e) => warn!(login = %sender.login, error = %e, "Failed to build stats badge"),
    }

    Attachment::new(body)
        .with_color(style::WATCH_COLOR)
        .with_thumb(style::WATCH_THUMBNAIL)
}

/// 统计徽章图片（仅由 login 决定）
fn stats_badge(login: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse_with_params(
        style::STATS_BADGE_URL,
        &[("username", login), ("hide", "stars"), ("hide_rank", "true")],
    )?;
    Ok(format!("![Github Stats]({})", url))
}

fn render_default(ctx: &RenderContext<'_>) -> Attachment {
    Attachment::new(ctx.title)
        .with_color(style::DEFAULT_COLOR)
        .with_fallback(format!(
            "{} by {} in {}",
            ctx.kind_label, ctx.env.sender.login, ctx.env.repository.full_name
        ))
}
