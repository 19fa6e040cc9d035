// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Cursor;

#[test]
fn parses_a_tool_use_record() {
    let record = parse_line(r#"{"type":"tool_use","name":"grep","target":"src/main.rs"}"#).unwrap();
    assert_eq!(
        record,
        AdapterRecord::ToolUse {
            name: "grep".to_string(),
            target: Some("src/main.rs".to_string()),
        }
    );
}

#[test]
fn parses_a_progress_record_clamping_percent_to_100() {
    let record = parse_line(r#"{"type":"progress","percent":140,"message":"thinking"}"#).unwrap();
    assert_eq!(
        record,
        AdapterRecord::Progress {
            percent: Some(100),
            message: Some("thinking".to_string()),
            tokens_used: None,
        }
    );
}

#[test]
fn parses_a_result_record_with_artifacts() {
    let record = parse_line(
        r#"{"type":"result","tokens_estimate":4200,"subtype":"success","artifacts":["out.md"]}"#,
    )
    .unwrap();
    assert_eq!(
        record,
        AdapterRecord::Result {
            tokens_estimate: 4200,
            subtype: Some("success".to_string()),
            content: None,
            artifacts: vec!["out.md".to_string()],
        }
    );
}

#[test]
fn discards_non_json_lines() {
    assert!(parse_line("not json at all").is_none());
}

#[test]
fn discards_json_without_a_recognized_type() {
    assert!(parse_line(r#"{"type":"heartbeat"}"#).is_none());
    assert!(parse_line(r#"{"unrelated":true}"#).is_none());
}

#[test]
fn discards_blank_lines() {
    assert!(parse_line("").is_none());
    assert!(parse_line("   ").is_none());
}

#[tokio::test]
async fn stream_reader_skips_garbage_and_counts_it() {
    let input = concat!(
        "garbage line\n",
        r#"{"type":"tool_use","name":"grep","target":null}"#,
        "\n",
        "more garbage\n",
        r#"{"type":"result","tokens_estimate":10,"subtype":"success"}"#,
        "\n",
    );
    let mut reader = StreamReader::new(Cursor::new(input));

    let first = reader.next_record().await.unwrap().unwrap();
    assert_eq!(
        first,
        AdapterRecord::ToolUse {
            name: "grep".to_string(),
            target: None,
        }
    );

    let second = reader.next_record().await.unwrap().unwrap();
    assert_eq!(
        second,
        AdapterRecord::Result {
            tokens_estimate: 10,
            subtype: Some("success".to_string()),
            content: None,
            artifacts: Vec::new(),
        }
    );

    assert!(reader.next_record().await.unwrap().is_none());
    assert_eq!(reader.discarded(), 2);
}
