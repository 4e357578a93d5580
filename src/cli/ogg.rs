use anyhow::Result;
use serde::Serialize;

use super::command::OggArgs;
use crate::input::InputReader;
use oggcaf::process::ogg::{OpusHeaders, PageScanner, read_stream_headers};
use oggcaf::structs::ogg::Page;

pub fn cmd_ogg(args: &OggArgs) -> Result<()> {
    log::info!("Inspecting paged container: {}", args.input.display());

    let input = InputReader::new(&args.input)?;
    let mut scanner = PageScanner::new(input);

    let headers = if args.skip_headers {
        None
    } else {
        Some(HeadersReport::from_headers(&read_stream_headers(
            &mut scanner,
        )?))
    };

    let mut pages = Vec::new();
    while args
        .max_pages
        .is_none_or(|max| scanner.pages_read() < max)
    {
        let Some(page) = scanner.next().transpose()? else {
            break;
        };
        pages.push(PageReport::from_page(&page));
    }

    log::info!(
        "Read {} pages, {} bytes total",
        scanner.pages_read(),
        scanner.position()
    );

    let report = OggReport {
        headers,
        pages_read: scanner.pages_read(),
        checksum_failures: pages.iter().filter(|p| !p.checksum_passed).count() as u64,
        bytes_skipped: scanner.bytes_skipped(),
        bytes_read: scanner.position(),
        pages,
    };
    print!("{}", serde_yaml_ng::to_string(&report)?);

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OggReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<HeadersReport>,
    pages_read: u64,
    checksum_failures: u64,
    bytes_skipped: u64,
    bytes_read: u64,
    pages: Vec<PageReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeadersReport {
    version: u8,
    channel_count: u8,
    pre_skip: u16,
    input_sample_rate: u32,
    output_gain: u16,
    mapping_family: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupled_count: Option<u8>,
    vendor: String,
    user_comments: Vec<String>,
}

impl HeadersReport {
    fn from_headers(headers: &OpusHeaders) -> Self {
        let id = &headers.identification;
        let mapping = id.channel_mapping.as_ref();

        Self {
            version: id.version,
            channel_count: id.channel_count,
            pre_skip: id.pre_skip,
            input_sample_rate: id.input_sample_rate,
            output_gain: id.output_gain,
            mapping_family: id.mapping_family,
            stream_count: mapping.map(|m| m.stream_count),
            coupled_count: mapping.map(|m| m.coupled_count),
            vendor: headers.comments.vendor.clone(),
            user_comments: headers.comments.user_comments.clone(),
        }
    }
}

/// One line per page; segment payloads are summarized by length.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageReport {
    sequence: u32,
    serial: u32,
    granule_position: u64,
    beginning_of_stream: bool,
    end_of_stream: bool,
    continued_packet: bool,
    segments: Vec<u8>,
    payload_bytes: usize,
    stored_checksum: String,
    computed_checksum: String,
    checksum_passed: bool,
}

impl PageReport {
    fn from_page(page: &Page) -> Self {
        Self {
            sequence: page.header.page_sequence_number,
            serial: page.header.stream_serial_number,
            granule_position: page.header.absolute_granule_position,
            beginning_of_stream: page.header.is_beginning_of_stream(),
            end_of_stream: page.header.is_end_of_stream(),
            continued_packet: !page.header.is_fresh_packet(),
            segments: page.lacing_table.clone(),
            payload_bytes: page.payload_len(),
            stored_checksum: format!("{:#010X}", page.header.page_checksum),
            computed_checksum: format!("{:#010X}", page.computed_checksum),
            checksum_passed: page.checksum_passed,
        }
    }
}
