use crate::http::Payload;
use crate::runner::ResponseOutcome;
use colored::*;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format(&self, outcome: &ResponseOutcome) -> String {
        let mut output = vec![self.status_line(outcome), self.timing_line(outcome)];

        if let ResponseFormat::Verbose = self.format
            && !outcome.headers.is_empty()
        {
            output.push(String::new());
            output.push(self.paint("Headers:", |s| s.blue().bold()));
            for (key, value) in outcome.headers.iter() {
                let value_str = value.to_str().unwrap_or("<invalid utf-8>");
                output.push(self.paint(&format!("   {}: {}", key, value_str), |s| s.blue()));
            }
        }

        let body = format_body(&outcome.data);
        match self.format {
            ResponseFormat::Compact => {
                // 紧凑模式下只展示较短的响应体
                if !body.is_empty() && body.len() < 200 {
                    output.push(body);
                } else if !body.is_empty() {
                    output.push(format!("Body: {} bytes", outcome.size_bytes));
                }
            }
            ResponseFormat::Verbose => {
                if !body.is_empty() {
                    output.push(String::new());
                    output.push(self.paint("Body:", |s| s.blue().bold()));
                    output.push(body);
                }
            }
        }

        output.join("\n")
    }

    fn status_line(&self, outcome: &ResponseOutcome) -> String {
        if outcome.is_transport_failure() {
            let line = format!("Request failed: {}", outcome.status_text);
            return self.paint(&line, |s| s.red().bold());
        }

        let line = format!("HTTP {} {}", outcome.status, outcome.status_text);
        if outcome.is_success() {
            self.paint(&line, |s| s.green())
        } else if outcome.is_client_error() {
            self.paint(&line, |s| s.yellow())
        } else {
            self.paint(&line, |s| s.red())
        }
    }

    fn timing_line(&self, outcome: &ResponseOutcome) -> String {
        let line = format!(
            "Time: {}ms  Size: {} bytes",
            outcome.elapsed_millis, outcome.size_bytes
        );
        self.paint(&line, |s| s.cyan())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// JSON 数据以缩进格式输出，文本原样输出
fn format_body(data: &Payload) -> String {
    match data {
        Payload::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Payload::Text(text) => text.clone(),
    }
}
