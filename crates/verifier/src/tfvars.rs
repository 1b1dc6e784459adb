//! 변수 파일 파서
//!
//! 프로비저닝 도구의 변수 파일(HCL 속성 부분집합)을 파싱합니다.
//!
//! # 지원 구문
//! ```text
//! name        = "ecr-test"              # 문자열 (\" \\ \n \t \r 이스케이프)
//! count       = 2                       // 숫자 (음수, 소수, 지수)
//! enabled     = true                    /* bool, null */
//! names       = ["a", "b",]             # 리스트 (후행 쉼표, 여러 줄 허용)
//! tags        = { Env = "test", "k": 1 } # 맵 (= 또는 :, 쉼표 또는 줄바꿈 구분)
//! policy      = <<-EOT
//!   {"rules": []}
//!   EOT
//! ```
//!
//! 최상위 키 중복은 에러입니다. 보간(`${...}`)은 해석하지 않고 문자열 그대로 둡니다.

use std::collections::BTreeMap;

use crate::value::TfValue;

/// 리스트/맵 최대 중첩 깊이
const MAX_NESTING_DEPTH: usize = 64;

/// 파싱 에러 (1부터 시작하는 줄 번호 포함)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct TfvarsError {
    /// 에러 위치 줄 번호
    pub line: usize,
    /// 에러 사유
    pub reason: String,
}

/// 변수 파일 내용을 파싱하여 변수 이름 → 값 맵을 반환합니다.
pub fn parse_tfvars(input: &str) -> Result<BTreeMap<String, TfValue>, TfvarsError> {
    Parser::new(input).parse_file()
}

struct Parser {
    chars: Vec<char>,
    /// 줄바꿈 문자의 위치 (오름차순)
    newlines: Vec<usize>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let chars: Vec<char> = input.chars().collect();
        let newlines = chars
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c == '\n').then_some(i))
            .collect();
        Self {
            chars,
            newlines,
            pos: 0,
            depth: 0,
        }
    }

    fn parse_file(mut self) -> Result<BTreeMap<String, TfValue>, TfvarsError> {
        let mut values = BTreeMap::new();
        loop {
            self.skip_whitespace(true)?;
            if self.at_end() {
                return Ok(values);
            }

            let key_line = self.line();
            let key = self.parse_identifier()?;
            self.skip_whitespace(false)?;
            if !self.eat('=') {
                return Err(self.error(format!("expected '=' after '{key}'")));
            }
            self.skip_whitespace(false)?;
            let value = self.parse_value()?;
            self.skip_whitespace(false)?;
            if !self.at_end() && !self.eat('\n') {
                return Err(self.error("expected newline after value"));
            }

            if values.contains_key(&key) {
                return Err(TfvarsError {
                    line: key_line,
                    reason: format!("duplicate variable '{key}'"),
                });
            }
            values.insert(key, value);
        }
    }

    // --- 위치 헬퍼 ---

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn line(&self) -> usize {
        self.newlines.partition_point(|&nl| nl < self.pos) + 1
    }

    fn error(&self, reason: impl Into<String>) -> TfvarsError {
        TfvarsError {
            line: self.line(),
            reason: reason.into(),
        }
    }

    /// 공백과 주석을 건너뜁니다. `newlines`가 false면 줄바꿈에서 멈춥니다.
    fn skip_whitespace(&mut self, newlines: bool) -> Result<(), TfvarsError> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => self.pos += 1,
                '\n' if newlines => self.pos += 1,
                '#' => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), TfvarsError> {
        let start_line = self.line();
        self.pos += 2;
        while !self.at_end() {
            if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(TfvarsError {
            line: start_line,
            reason: "unterminated block comment".to_owned(),
        })
    }

    // --- 토큰 ---

    fn parse_identifier(&mut self) -> Result<String, TfvarsError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.pos += 1,
            Some(c) => return Err(self.error(format!("unexpected character '{c}'"))),
            None => return Err(self.error("unexpected end of input")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_value(&mut self) -> Result<TfValue, TfvarsError> {
        match self.peek() {
            Some('"') => self.parse_string().map(TfValue::String),
            Some('<') if self.peek_at(1) == Some('<') => self.parse_heredoc().map(TfValue::String),
            Some('[') => self.nested(Self::parse_list),
            Some('{') => self.nested(Self::parse_map),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.parse_identifier()?;
                match word.as_str() {
                    "true" => Ok(TfValue::Bool(true)),
                    "false" => Ok(TfValue::Bool(false)),
                    "null" => Ok(TfValue::Null),
                    other => Err(self.error(format!(
                        "unsupported expression '{other}' (only literal values are allowed)"
                    ))),
                }
            }
            Some('\n') | None => Err(self.error("missing value")),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<TfValue, TfvarsError>,
    ) -> Result<TfValue, TfvarsError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_NESTING_DEPTH}")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_string(&mut self) -> Result<String, TfvarsError> {
        let start_line = self.line();
        self.pos += 1; // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(TfvarsError {
                        line: start_line,
                        reason: "unterminated string".to_owned(),
                    });
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(other) => {
                            return Err(self.error(format!("invalid escape '\\{other}'")));
                        }
                        None => return Err(self.error("unterminated string")),
                    };
                    out.push(escaped);
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_heredoc(&mut self) -> Result<String, TfvarsError> {
        let start_line = self.line();
        self.pos += 2;
        let strip_indent = self.eat('-');
        let marker = self.parse_identifier()?;
        self.skip_whitespace(false)?;
        if !self.eat('\n') {
            return Err(self.error("expected newline after heredoc marker"));
        }

        let mut lines: Vec<String> = Vec::new();
        loop {
            if self.at_end() {
                return Err(TfvarsError {
                    line: start_line,
                    reason: format!("unterminated heredoc, missing '{marker}'"),
                });
            }
            let line_start = self.pos;
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.pos += 1;
            }
            let line: String = self.chars[line_start..self.pos].iter().collect();
            let line = line.strip_suffix('\r').unwrap_or(&line).to_owned();
            if line.trim() == marker {
                break;
            }
            lines.push(line);
            self.eat('\n');
        }

        if strip_indent {
            let leading = |l: &str| l.len() - l.trim_start_matches([' ', '\t']).len();
            let indent = lines
                .iter()
                .filter(|l| !l.trim().is_empty())
                .map(|l| leading(l))
                .min()
                .unwrap_or(0);
            for line in &mut lines {
                let cut = indent.min(leading(line));
                line.drain(..cut);
            }
        }

        let mut text = lines.join("\n");
        if !lines.is_empty() {
            text.push('\n');
        }
        Ok(text)
    }

    fn parse_number(&mut self) -> Result<TfValue, TfvarsError> {
        let start = self.pos;
        self.eat('-');
        if !self.take_digits() {
            return Err(self.error("invalid number"));
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            if !self.take_digits() {
                return Err(self.error("invalid number: expected digits after '.'"));
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if !self.take_digits() {
                return Err(self.error("invalid number: expected exponent digits"));
            }
        }
        Ok(TfValue::Number(self.chars[start..self.pos].iter().collect()))
    }

    fn take_digits(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<TfValue, TfvarsError> {
        let start_line = self.line();
        self.pos += 1; // [
        let mut items = Vec::new();
        loop {
            self.skip_whitespace(true)?;
            match self.peek() {
                None => {
                    return Err(TfvarsError {
                        line: start_line,
                        reason: "unterminated list".to_owned(),
                    });
                }
                Some(']') => {
                    self.pos += 1;
                    return Ok(TfValue::List(items));
                }
                Some(_) => {}
            }

            items.push(self.parse_value()?);
            self.skip_whitespace(true)?;
            if !self.eat(',') && self.peek() != Some(']') {
                if self.at_end() {
                    continue;
                }
                return Err(self.error("expected ',' or ']' in list"));
            }
        }
    }

    fn parse_map(&mut self) -> Result<TfValue, TfvarsError> {
        let start_line = self.line();
        self.pos += 1; // {
        let mut map = BTreeMap::new();
        loop {
            self.skip_whitespace(true)?;
            let key = match self.peek() {
                None => {
                    return Err(TfvarsError {
                        line: start_line,
                        reason: "unterminated map".to_owned(),
                    });
                }
                Some('}') => {
                    self.pos += 1;
                    return Ok(TfValue::Map(map));
                }
                Some('"') => self.parse_string()?,
                Some(_) => self.parse_identifier()?,
            };

            self.skip_whitespace(false)?;
            if !self.eat('=') && !self.eat(':') {
                return Err(self.error(format!("expected '=' or ':' after map key '{key}'")));
            }
            self.skip_whitespace(false)?;
            let value = self.parse_value()?;
            if map.contains_key(&key) {
                return Err(self.error(format!("duplicate map key '{key}'")));
            }
            map.insert(key, value);

            self.skip_whitespace(false)?;
            match self.peek() {
                Some(',') | Some('\n') => self.pos += 1,
                Some('}') | None => {}
                Some(c) => return Err(self.error(format!("unexpected character '{c}' in map"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> BTreeMap<String, TfValue> {
        parse_tfvars(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn s(v: &str) -> TfValue {
        TfValue::String(v.to_owned())
    }

    #[test]
    fn simple_string_attribute() {
        let vars = parse("name = \"ecr-test\"\n");
        assert_eq!(vars["name"], s("ecr-test"));
    }

    #[test]
    fn last_line_without_newline() {
        let vars = parse("name = \"ecr-test\"");
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn scalar_types() {
        let vars = parse(
            "a = 1\nb = -2.5\nc = 1e3\nd = true\ne = false\nf = null\ng = \"x\"\n",
        );
        assert_eq!(vars["a"], TfValue::Number("1".to_owned()));
        assert_eq!(vars["b"], TfValue::Number("-2.5".to_owned()));
        assert_eq!(vars["c"], TfValue::Number("1e3".to_owned()));
        assert_eq!(vars["d"], TfValue::Bool(true));
        assert_eq!(vars["e"], TfValue::Bool(false));
        assert_eq!(vars["f"], TfValue::Null);
    }

    #[test]
    fn string_escapes() {
        let vars = parse(r#"v = "a\"b\\c\nd\te""#);
        assert_eq!(vars["v"], s("a\"b\\c\nd\te"));
    }

    #[test]
    fn interpolation_is_kept_verbatim() {
        let vars = parse("v = \"${var.name}-repo\"\n");
        assert_eq!(vars["v"], s("${var.name}-repo"));
    }

    #[test]
    fn comments_of_all_styles() {
        let vars = parse(
            "# header\n// another\n/* block\n spanning */ name = \"a\" # trailing\nother = 1 // end\n",
        );
        assert_eq!(vars["name"], s("a"));
        assert_eq!(vars["other"], TfValue::Number("1".to_owned()));
    }

    #[test]
    fn multiline_list_with_trailing_comma() {
        let vars = parse("repository_names = [\n  \"a1\",\n  \"b2\", # second\n]\n");
        assert_eq!(vars["repository_names"], TfValue::List(vec![s("a1"), s("b2")]));
    }

    #[test]
    fn empty_list_and_map() {
        let vars = parse("a = []\nb = {}\n");
        assert_eq!(vars["a"], TfValue::List(vec![]));
        assert_eq!(vars["b"], TfValue::Map(BTreeMap::new()));
    }

    #[test]
    fn map_with_mixed_separators() {
        let vars = parse(
            "tags = {\n  Environment = \"test\"\n  \"cost-center\": \"42\", Owner = \"platform\"\n}\n",
        );
        let TfValue::Map(map) = &vars["tags"] else {
            panic!("expected map");
        };
        assert_eq!(map["Environment"], s("test"));
        assert_eq!(map["cost-center"], s("42"));
        assert_eq!(map["Owner"], s("platform"));
    }

    #[test]
    fn nested_structures() {
        let vars = parse("rules = [{ priority = 1, tags = [\"v\"] }]\n");
        let TfValue::List(items) = &vars["rules"] else {
            panic!("expected list");
        };
        assert_eq!(items[0].type_name(), "map");
    }

    #[test]
    fn heredoc_keeps_content() {
        let vars = parse("policy = <<EOT\n{\n  \"a\": 1\n}\nEOT\nname = \"x\"\n");
        assert_eq!(vars["policy"], s("{\n  \"a\": 1\n}\n"));
        assert_eq!(vars["name"], s("x"));
    }

    #[test]
    fn indented_heredoc_strips_common_indent() {
        let vars = parse("policy = <<-EOT\n    line1\n      line2\n    EOT\n");
        assert_eq!(vars["policy"], s("line1\n  line2\n"));
    }

    #[test]
    fn duplicate_key_is_error_with_line() {
        let err = parse_tfvars("name = \"a\"\n\nname = \"b\"\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.reason.contains("duplicate"));
    }

    #[test]
    fn long_multiline_list_reports_last_line() {
        let entries = 100_000;
        let mut input = String::from("names = [\n");
        for i in 0..entries {
            input.push_str(&format!("  \"repo-{i}\",\n"));
        }
        input.push_str("]\nbroken\n");

        // 여는 줄, 항목들, 닫는 괄호 다음 줄
        let err = parse_tfvars(&input).unwrap_err();
        assert_eq!(err.line, entries + 3);
        assert!(err.reason.contains("'broken'"), "{}", err.reason);

        input.truncate(input.len() - "broken\n".len());
        let vars = parse_tfvars(&input).unwrap();
        assert_eq!(vars["names"].as_names().unwrap().len(), entries);
    }

    #[test]
    fn unterminated_string_reports_start_line() {
        let err = parse_tfvars("a = 1\nname = \"ecr\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("unterminated string"));
    }

    #[test]
    fn unterminated_list_and_heredoc() {
        assert!(parse_tfvars("a = [1, 2\n").is_err());
        assert!(parse_tfvars("a = <<EOT\nbody\n").is_err());
        assert!(parse_tfvars("/* never closed").is_err());
    }

    #[test]
    fn rejects_expressions_and_garbage() {
        assert!(parse_tfvars("a = var.name\n").is_err());
        assert!(parse_tfvars("a \"x\"\n").is_err());
        assert!(parse_tfvars("a = 1 2\n").is_err());
        assert!(parse_tfvars("= 1\n").is_err());
        assert!(parse_tfvars("a =\n").is_err());
        assert!(parse_tfvars("a = [1 2]\n").is_err());
        assert!(parse_tfvars("a = 1.\n").is_err());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let input = format!("a = {}{}\n", "[".repeat(100), "]".repeat(100));
        let err = parse_tfvars(&input).unwrap_err();
        assert!(err.reason.contains("nesting"));
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(parse("").is_empty());
        assert!(parse("\n# only comments\n").is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let vars = parse("name = \"a\"\r\ncount = 2\r\n");
        assert_eq!(vars["name"], s("a"));
        assert_eq!(vars["count"], TfValue::Number("2".to_owned()));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics(input in "\\PC{0,256}") {
                let _ = parse_tfvars(&input);
            }

            #[test]
            fn string_values_survive(name in "[a-z][a-z0-9_]{0,15}", value in "[a-zA-Z0-9 ./:-]{0,40}") {
                let vars = parse_tfvars(&format!("{name} = \"{value}\"\n")).unwrap();
                prop_assert_eq!(&vars[&name], &TfValue::String(value));
            }
        }
    }
}
