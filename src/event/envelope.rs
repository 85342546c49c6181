//! 事件文档模型
//!
//! `repository` 和 `sender` 是必需的，解析时校验；其余嵌套字段按事件类型惰性读取，
//! 通过 [`Facet`] 访问：缺失、null、类型不符一律视为"不存在"，不会报错。

use serde_json::Value;

use crate::error::NotifyError;

/// JSON 片段的可选访问器
///
/// 包装一个可能不存在的 `Value`，所有读取都返回 `Option`，由调用方决定如何降级。
#[derive(Debug, Clone, Copy)]
pub struct Facet<'a>(Option<&'a Value>);

impl<'a> Facet<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        Self(value)
    }

    /// 是否存在且非 null
    pub fn is_present(self) -> bool {
        matches!(self.0, Some(v) if !v.is_null())
    }

    /// 子对象
    pub fn get(self, key: &str) -> Facet<'a> {
        Facet(self.0.and_then(|v| v.get(key)))
    }

    /// 字符串字段
    pub fn str(self, key: &str) -> Option<&'a str> {
        self.0?.get(key)?.as_str()
    }

    /// 非空字符串字段
    pub fn text(self, key: &str) -> Option<&'a str> {
        self.str(key).filter(|s| !s.is_empty())
    }

    /// 布尔字段，缺失视为 false
    pub fn flag(self, key: &str) -> bool {
        self.0
            .and_then(|v| v.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// 非负整数字段
    pub fn u64(self, key: &str) -> Option<u64> {
        self.0?.get(key)?.as_u64()
    }

    /// 标量字段（字符串或数字）转为文本，如 PR 编号
    pub fn scalar(self, key: &str) -> Option<String> {
        match self.0?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 数组字段的元素；缺失或非数组时为空
    pub fn items(self, key: &str) -> impl Iterator<Item = Facet<'a>> {
        self.0
            .and_then(|v| v.get(key))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|v| Facet(Some(v)))
    }
}

/// 事件触发者
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    /// 显示用户名
    pub login: String,
    /// 主页链接
    pub html_url: String,
    /// 头像链接
    pub avatar_url: String,
    /// API 资源链接（仅用于资料补充）
    pub url: String,
}

impl Actor {
    fn from_facet(facet: Facet<'_>) -> Self {
        let field = |key: &str| facet.str(key).unwrap_or_default().to_string();
        Self {
            login: field("login"),
            html_url: field("html_url"),
            avatar_url: field("avatar_url"),
            url: field("url"),
        }
    }
}

/// 仓库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
    pub stargazers_count: Option<u64>,
}

impl Repository {
    fn from_facet(facet: Facet<'_>) -> Self {
        Self {
            full_name: facet.str("full_name").unwrap_or_default().to_string(),
            html_url: facet.str("html_url").unwrap_or_default().to_string(),
            stargazers_count: facet.u64("stargazers_count"),
        }
    }
}

/// 解析后的事件文档
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    raw: String,
    root: Value,
    pub repository: Repository,
    pub sender: Actor,
}

impl EventEnvelope {
    /// 解析归一化后的 JSON 文本
    pub fn parse(json_text: &str) -> Result<Self, NotifyError> {
        let root: Value = serde_json::from_str(json_text)
            .map_err(|e| NotifyError::MalformedEvent(format!("invalid JSON: {}", e)))?;

        if !root.is_object() {
            return Err(NotifyError::MalformedEvent(
                "event document is not a JSON object".to_string(),
            ));
        }

        for key in ["repository", "sender"] {
            if !root.get(key).map(Value::is_object).unwrap_or(false) {
                return Err(NotifyError::MalformedEvent(format!(
                    "missing `{}` object",
                    key
                )));
            }
        }

        let repository = Repository::from_facet(Facet(root.get("repository")));
        let sender = Actor::from_facet(Facet(root.get("sender")));

        Ok(Self {
            raw: json_text.to_string(),
            root,
            repository,
            sender,
        })
    }

    /// 原始 JSON 文本（原样嵌入 `props.card`）
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 顶层访问器
    pub fn root(&self) -> Facet<'_> {
        Facet(Some(&self.root))
    }

    /// 顶层子对象
    pub fn facet(&self, key: &str) -> Facet<'_> {
        self.root().get(key)
    }

    /// 非空的 `action`
    pub fn action(&self) -> Option<&str> {
        self.root().text("action")
    }
}
