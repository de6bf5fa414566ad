use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::http::types::{Method, Payload};
use crate::{ReqdeckError, Result};

/// 保持插入顺序的字符串键值表（headers / queryParams）
pub type StringMap = IndexMap<String, String>;

/// 用户提交的请求描述（API 入参）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescription {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<StringMap>,
    #[serde(default)]
    pub query_params: Option<StringMap>,
    #[serde(default)]
    pub body: Option<String>,
}

impl RequestDescription {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            method: Some(method.to_string()),
            ..Default::default()
        }
    }
}

/// 经过校验、可直接发送的请求
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Option<StringMap>,
    pub query_params: Option<StringMap>,
    /// 用户输入的原始请求体（写入历史记录）
    pub body: Option<String>,
    /// 实际发送的 payload
    pub payload: Option<Payload>,
}

impl TryFrom<RequestDescription> for Request {
    type Error = ReqdeckError;

    fn try_from(desc: RequestDescription) -> Result<Self> {
        let url = desc.url.filter(|u| !u.trim().is_empty());
        let method = desc.method.filter(|m| !m.trim().is_empty());

        let (Some(url), Some(method)) = (url, method) else {
            return Err(ReqdeckError::validation("URL and Method are required"));
        };

        let mut request = Request::new(&method, &url)?;
        request.headers = desc.headers;
        request.query_params = desc.query_params;
        if let Some(body) = desc.body {
            request = request.with_body(&body);
        }
        Ok(request)
    }
}

impl Request {
    pub fn new(method: &str, url: &str) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            url: url.trim().to_string(),
            headers: None,
            query_params: None,
            body: None,
            payload: None,
        })
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(StringMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params
            .get_or_insert_with(StringMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// 设置请求体，按 JSON 嗅探规则决定 payload
    pub fn with_body(mut self, body: &str) -> Self {
        self.payload = Payload::from_request_body(body);
        self.body = Some(body.to_string());
        self
    }

    pub fn header_pairs(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers.iter().flat_map(|h| h.iter())
    }

    pub fn query_pairs(&self) -> impl Iterator<Item = (&String, &String)> {
        self.query_params.iter().flat_map(|q| q.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_description_from_json() {
        let desc: RequestDescription = serde_json::from_value(json!({
            "url": "https://example.com/api",
            "method": "post",
            "headers": {"X-Token": "abc"},
            "queryParams": {"q": "search"},
            "body": "{\"a\": 1}"
        }))
        .unwrap();

        let request = Request::try_from(desc).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://example.com/api");
        assert_eq!(request.headers.as_ref().unwrap()["X-Token"], "abc");
        assert_eq!(request.query_params.as_ref().unwrap()["q"], "search");
        assert_eq!(request.body.as_deref(), Some("{\"a\": 1}"));
        assert_eq!(request.payload, Some(Payload::Json(json!({"a": 1}))));
    }

    #[test]
    fn test_missing_url_or_method() {
        let missing_url = RequestDescription {
            method: Some("GET".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Request::try_from(missing_url),
            Err(ReqdeckError::ValidationError(_))
        ));

        let blank_method = RequestDescription::new("  ", "http://example.com");
        assert!(matches!(
            Request::try_from(blank_method),
            Err(ReqdeckError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let desc = RequestDescription::new("CONNECT", "http://example.com");
        assert!(matches!(
            Request::try_from(desc),
            Err(ReqdeckError::ValidationError(_))
        ));
    }

    #[test]
    fn test_optional_maps_stay_absent() {
        let request = Request::try_from(RequestDescription::new("GET", "http://example.com"))
            .unwrap();
        assert!(request.headers.is_none());
        assert!(request.query_params.is_none());
        assert!(request.body.is_none());
        assert!(request.payload.is_none());
        assert_eq!(request.header_pairs().count(), 0);
    }

    #[test]
    fn test_query_params_keep_submitted_order() {
        let desc: RequestDescription = serde_json::from_str(
            r#"{"url":"http://example.com","method":"GET","queryParams":{"z":"1","a":"2","m":"3"}}"#,
        )
        .unwrap();
        let request = Request::try_from(desc).unwrap().with_query("b", "4");

        let keys: Vec<&str> = request.query_pairs().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m", "b"]);

        let url = reqwest::Url::parse_with_params(&request.url, request.query_pairs()).unwrap();
        assert_eq!(url.query(), Some("z=1&a=2&m=3&b=4"));
    }

    #[test]
    fn test_blank_body_keeps_raw_but_sends_nothing() {
        let request = Request::new("POST", "http://example.com")
            .unwrap()
            .with_body("   ");
        assert_eq!(request.body.as_deref(), Some("   "));
        assert!(request.payload.is_none());
    }
}
