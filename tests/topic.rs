//! A single-block WinHelp 3.0 `|TOPIC` walk: one `0x02` TopicHeader
//! link opening a topic, followed by a `0x01` display-text link,
//! checked end-to-end through `parse_topics`.

use winhelp::compress::Method;
use winhelp::options::ParseOptions;
use winhelp::system::CodePage;
use winhelp::topic::{parse_topics, TopicContext};

const TOPIC_LINK_SIZE: usize = 21;

fn push_link_header(
    buf: &mut Vec<u8>,
    block_size: i32,
    data_len2: i32,
    prev_block: i32,
    next_block: i32,
    data_len1: i32,
    record_type: u8,
) {
    buf.extend_from_slice(&block_size.to_le_bytes());
    buf.extend_from_slice(&data_len2.to_le_bytes());
    buf.extend_from_slice(&prev_block.to_le_bytes());
    buf.extend_from_slice(&next_block.to_le_bytes());
    buf.extend_from_slice(&data_len1.to_le_bytes());
    buf.push(record_type);
}

fn build_v30_topic_payload() -> Vec<u8> {
    // 12-byte TopicBlockHeader; contents unused by parse_topics.
    let mut data = vec![0u8; 12];

    // Link 1: 0x02 TopicHeader30, opens a topic numbered 16.
    let link1_data1_size = 12usize;
    let link1_block_size = (TOPIC_LINK_SIZE + link1_data1_size) as i32;
    push_link_header(
        &mut data,
        link1_block_size,
        0,
        -1,
        link1_block_size,
        (TOPIC_LINK_SIZE + link1_data1_size) as i32,
        0x02,
    );
    data.extend_from_slice(&33i32.to_le_bytes()); // TopicHeader30.block_size (unused)
    data.extend_from_slice(&16i16.to_le_bytes()); // prev_topic_num
    data.extend_from_slice(&0i16.to_le_bytes()); // unused1
    data.extend_from_slice(&(-1i16).to_le_bytes()); // next_topic_num
    data.extend_from_slice(&0i16.to_le_bytes()); // unused2

    // Link 2: 0x01 display text "Hi", ends the chain.
    let link2_data1_size = 6usize; // ParagraphInfo30: topic_size:i32 + topic_length:u16
    let link2_data_len1 = (TOPIC_LINK_SIZE + link2_data1_size) as i32;
    let link2_text = b"Hi";
    let link2_block_size = link2_data_len1 + link2_text.len() as i32;
    push_link_header(
        &mut data,
        link2_block_size,
        link2_text.len() as i32,
        -1,
        0,
        link2_data_len1,
        0x01,
    );
    data.extend_from_slice(&29i32.to_le_bytes()); // ParagraphInfo30.topic_size (unused)
    data.extend_from_slice(&2u16.to_le_bytes()); // ParagraphInfo30.topic_length
    data.extend_from_slice(link2_text);

    data
}

#[test]
fn parses_one_topic_with_header_and_display_text() {
    let payload = build_v30_topic_payload();
    let options = ParseOptions::default();
    let ctx = TopicContext {
        before_31: true,
        block_size: 2048,
        method: Method::Identity,
        codepage: CodePage::Cp1252,
        phrases: None,
        options: &options,
    };

    let topics = parse_topics(&payload, &ctx).unwrap();
    assert_eq!(topics.len(), 1);
    let topic = &topics[0];
    assert_eq!(topic.topic_number, Some(16));
    assert_eq!(topic.next_topic, Some(-1));
    assert_eq!(topic.topic_offset, 12);

    let text: String = topic.spans.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(text, "Hi");
}

#[test]
fn plain_text_is_idempotent_across_reparse() {
    let payload = build_v30_topic_payload();
    let options = ParseOptions::default();
    let ctx = TopicContext {
        before_31: true,
        block_size: 2048,
        method: Method::Identity,
        codepage: CodePage::Cp1252,
        phrases: None,
        options: &options,
    };

    let first = parse_topics(&payload, &ctx).unwrap()[0].get_plain_text();
    let second = parse_topics(&payload, &ctx).unwrap()[0].get_plain_text();
    assert_eq!(first, second);
    assert_eq!(first, "Hi");
}

#[test]
fn empty_topic_payload_yields_no_topics() {
    let options = ParseOptions::default();
    let ctx = TopicContext {
        before_31: true,
        block_size: 2048,
        method: Method::Identity,
        codepage: CodePage::Cp1252,
        phrases: None,
        options: &options,
    };
    assert!(parse_topics(&[], &ctx).unwrap().is_empty());
}
