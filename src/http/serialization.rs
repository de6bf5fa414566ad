use reqwest::header::HeaderMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// 将 HeaderMap 展平为 name -> value，同名 header 以 ", " 合并
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (k, v) in headers.iter() {
        // Convert header value to string (lossy if not UTF-8)
        let value = String::from_utf8_lossy(v.as_bytes()).into_owned();
        map.entry(k.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

pub mod header_map {
    use super::*;

    pub fn serialize<S>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        flatten_headers(headers).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert("x-request-id", HeaderValue::from_static("42"));

        let map = flatten_headers(&headers);
        assert_eq!(map["set-cookie"], "a=1, b=2");
        assert_eq!(map["x-request-id"], "42");
    }

    #[test]
    fn test_serialize_as_object() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(with = "header_map")]
            headers: HeaderMap,
        }

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        let json = serde_json::to_value(Wrapper { headers }).unwrap();
        assert_eq!(json["headers"]["content-type"], "text/plain");
    }
}
