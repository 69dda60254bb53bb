//! 查询参数翻译
//!
//! 每个资源声明一组可过滤字段（公开名、存储字段名、解析函数、可选变换、可选默认值），
//! 从 HTTP 查询参数中取值、按类型解析后生成持久化层使用的过滤谓词。
//! 解析失败的参数直接丢弃，不会报错。

use std::collections::HashMap;

use serde_json::Value;

/// 过滤谓词
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 字段等于给定值
    Eq(Value),
    /// 字段不等于给定值（字段缺失也视为不等）
    NotEq(Value),
    /// 字段等于列表中的任意一个值
    AnyOf(Vec<Value>),
}

/// 作用在单个存储字段上的过滤条件
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub predicate: Predicate,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            predicate: Predicate::Eq(value.into()),
        }
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            predicate: Predicate::NotEq(value.into()),
        }
    }

    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            predicate: Predicate::AnyOf(values),
        }
    }

    /// 判断 JSON 文档是否满足该条件
    pub fn matches(&self, document: &Value) -> bool {
        let actual = document.get(&self.field);
        match &self.predicate {
            Predicate::Eq(expected) => actual == Some(expected),
            Predicate::NotEq(expected) => actual != Some(expected),
            Predicate::AnyOf(candidates) => match actual {
                Some(actual) => {
                    let actual = as_text(actual);
                    candidates.iter().any(|c| as_text(c) == actual)
                }
                None => false,
            },
        }
    }
}

/// JSON 值的文本形式，与 PostgreSQL `->>` 的结果一致
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 参数解析函数：原始字符串 -> 类型化的值，失败返回 None
pub type Parser = fn(&str) -> Option<Value>;

/// 值变换函数：把解析后的值变成最终谓词
pub type Transform = fn(Value) -> Predicate;

// ==================== 解析函数 ====================

/// 布尔值，接受 1/t/T/TRUE/true/True 与 0/f/F/FALSE/false/False
pub fn parse_boolean(raw: &str) -> Option<Value> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(Value::Bool(true)),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(Value::Bool(false)),
        _ => None,
    }
}

pub fn parse_integer(raw: &str) -> Option<Value> {
    raw.parse::<i64>().ok().map(Value::from)
}

pub fn parse_number(raw: &str) -> Option<Value> {
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

pub fn parse_text(raw: &str) -> Option<Value> {
    Some(Value::String(raw.to_string()))
}

/// 逗号分隔的列表
pub fn parse_list(raw: &str) -> Option<Value> {
    let items: Vec<Value> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect();
    Some(Value::Array(items))
}

// ==================== 变换函数 ====================

/// 列表 -> "任意一个"，单值退化为只含一个元素的列表
pub fn any_of(value: Value) -> Predicate {
    match value {
        Value::Array(items) => Predicate::AnyOf(items),
        other => Predicate::AnyOf(vec![other]),
    }
}

/// 可过滤字段声明
#[derive(Debug, Clone)]
pub struct Queryable {
    /// 查询参数名
    pub public_name: &'static str,
    /// 存储中的字段名
    pub internal_name: &'static str,
    pub parser: Parser,
    pub transform: Option<Transform>,
    /// 参数缺失或为空时使用的默认值
    pub default: Option<&'static str>,
}

impl Queryable {
    fn with_parser(name: &'static str, parser: Parser) -> Self {
        Self {
            public_name: name,
            internal_name: name,
            parser,
            transform: None,
            default: None,
        }
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::with_parser(name, parse_boolean)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::with_parser(name, parse_integer)
    }

    pub fn number(name: &'static str) -> Self {
        Self::with_parser(name, parse_number)
    }

    pub fn text(name: &'static str) -> Self {
        Self::with_parser(name, parse_text)
    }

    pub fn list(name: &'static str) -> Self {
        Self::with_parser(name, parse_list)
    }

    /// 存储字段名与公开名不同
    pub fn stored_as(mut self, internal_name: &'static str) -> Self {
        self.internal_name = internal_name;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// 从参数表中读取并翻译为过滤条件
    pub fn read(&self, params: &HashMap<String, String>) -> Option<Filter> {
        let raw = params
            .get(self.public_name)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .or(self.default)
            .filter(|s| !s.is_empty())?;

        let value = (self.parser)(raw)?;
        let predicate = match self.transform {
            Some(transform) => transform(value),
            None => Predicate::Eq(value),
        };

        Some(Filter {
            field: self.internal_name.to_string(),
            predicate,
        })
    }
}

/// 资源的可过滤字段表
#[derive(Debug, Clone, Default)]
pub struct QuerySchema {
    fields: Vec<Queryable>,
}

impl QuerySchema {
    pub fn new(fields: Vec<Queryable>) -> Self {
        Self { fields }
    }

    /// 按公开名查找字段声明
    pub fn field(&self, public_name: &str) -> Option<&Queryable> {
        self.fields.iter().find(|f| f.public_name == public_name)
    }

    /// 把查询参数翻译为过滤条件，未声明的参数被忽略
    pub fn translate(&self, params: &HashMap<String, String>) -> Vec<Filter> {
        self.fields.iter().filter_map(|f| f.read(params)).collect()
    }
}
