// hccli - CLI for the Honeycomb API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Every failure a single API operation can surface.
///
/// Nothing here is retried; the command surface prints the message and
/// exits non-zero.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, HTTP timeout).
    #[error("request failed: {}", describe_transport(.0))]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status. The body is kept verbatim.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("decoding response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("encoding request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("timed out waiting for query result {result_id} after {waited_secs}s")]
    TimedOut { result_id: String, waited_secs: u64 },

    #[error("cancelled while waiting for query result {result_id}")]
    Cancelled { result_id: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout exceeded before the server responded".to_string()
    } else if err.is_connect() {
        "could not connect to the server".to_string()
    } else {
        "no response received".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status_and_raw_body() {
        let err = ApiError::Api {
            status: 404,
            body: r#"{"error":"dataset not found"}"#.into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            r#"API error (HTTP 404): {"error":"dataset not found"}"#
        );
    }

    #[test]
    fn timed_out_names_result_and_wait() {
        let err = ApiError::TimedOut {
            result_id: "res-1".into(),
            waited_secs: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("res-1"));
        assert!(msg.contains("3s"));
        assert_eq!(err.status(), None);
    }
}
