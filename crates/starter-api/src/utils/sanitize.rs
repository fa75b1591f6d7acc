//! 폼 입력 정리.
//!
//! 제출된 모든 폼 필드는 검증, 저장, 토큰 발급 전에 HTML 이스케이프됩니다.

/// HTML 특수 문자 5개(`& < > " '`)를 이스케이프합니다.
///
/// # 예시
///
/// ```
/// use starter_api::utils::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///     "&lt;b&gt;&#34;Tom&#34; &amp; &#39;Jerry&#39;&lt;/b&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 앞뒤 공백을 제거한 뒤 이스케이프합니다.
#[inline]
pub fn sanitize_field(input: &str) -> String {
    escape_html(input.trim())
}
