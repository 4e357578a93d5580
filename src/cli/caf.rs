use anyhow::Result;
use serde::Serialize;

use super::command::CafArgs;
use crate::input::InputReader;
use oggcaf::process::caf::CafReader;
use oggcaf::structs::caf::{CafRecord, ChannelLayout};

pub fn cmd_caf(args: &CafArgs) -> Result<()> {
    log::info!("Inspecting chunked container: {}", args.input.display());

    let input = InputReader::new(&args.input)?;
    let mut reader = CafReader::new(input);

    let header = *reader.read_file_header()?;

    let mut chunks = Vec::new();
    for chunk in reader.by_ref() {
        let chunk = chunk?;
        chunks.push(ChunkReport {
            offset: chunk.offset,
            chunk_type: chunk.header.chunk_type.to_string(),
            chunk_size: chunk.header.chunk_size,
            record: RecordReport::from_record(&chunk.record),
        });
    }

    let report = CafReport {
        file_type: header.file_type.to_string(),
        file_version: header.file_version,
        file_flags: header.file_flags,
        bytes_read: reader.position(),
        chunks,
    };

    log::info!(
        "Read {} chunks, {} bytes total",
        report.chunks.len(),
        report.bytes_read
    );

    print!("{}", serde_yaml_ng::to_string(&report)?);

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CafReport {
    file_type: String,
    file_version: u16,
    file_flags: u16,
    bytes_read: u64,
    chunks: Vec<ChunkReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChunkReport {
    offset: u64,
    chunk_type: String,
    chunk_size: i64,
    #[serde(flatten)]
    record: RecordReport,
}

/// Per-record report body. Opaque payloads are summarized by length
/// rather than dumped.
#[derive(Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum RecordReport {
    #[serde(rename_all = "camelCase")]
    AudioFormat {
        sample_rate: f64,
        format_id: String,
        format_flags: u32,
        bytes_per_packet: u32,
        frames_per_packet: u32,
        channels_per_frame: u32,
        bits_per_channel: u32,
    },
    #[serde(rename_all = "camelCase")]
    ChannelLayout {
        channel_layout_tag: u32,
        channel_bitmap: u32,
        descriptions: Vec<ChannelReport>,
    },
    #[serde(rename_all = "camelCase")]
    Data {
        edit_count: u32,
        payload_bytes: usize,
    },
    #[serde(rename_all = "camelCase")]
    PacketTable {
        number_packets: i64,
        number_valid_frames: i64,
        priming_frames: i32,
        remainder_frames: i32,
        packet_sizes: Vec<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Unknown { body_bytes: usize },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelReport {
    channel_label: u32,
    channel_flags: u32,
    coordinates: [f64; 3],
}

impl RecordReport {
    fn from_record(record: &CafRecord) -> Self {
        match record {
            CafRecord::AudioFormat(af) => Self::AudioFormat {
                sample_rate: af.sample_rate,
                format_id: af.format_id.to_string(),
                format_flags: af.format_flags,
                bytes_per_packet: af.bytes_per_packet,
                frames_per_packet: af.frames_per_packet,
                channels_per_frame: af.channels_per_frame,
                bits_per_channel: af.bits_per_channel,
            },
            CafRecord::ChannelLayout(layout) => Self::from_channel_layout(layout),
            CafRecord::Data(block) => Self::Data {
                edit_count: block.edit_count,
                payload_bytes: block.payload.len(),
            },
            CafRecord::PacketTable(table) => Self::PacketTable {
                number_packets: table.header.number_packets,
                number_valid_frames: table.header.number_valid_frames,
                priming_frames: table.header.priming_frames,
                remainder_frames: table.header.remainder_frames,
                packet_sizes: table.packet_sizes.clone(),
            },
            CafRecord::Unknown { body, .. } => Self::Unknown {
                body_bytes: body.len(),
            },
        }
    }

    fn from_channel_layout(layout: &ChannelLayout) -> Self {
        Self::ChannelLayout {
            channel_layout_tag: layout.channel_layout_tag,
            channel_bitmap: layout.channel_bitmap,
            descriptions: layout
                .descriptions
                .iter()
                .map(|d| ChannelReport {
                    channel_label: d.channel_label,
                    channel_flags: d.channel_flags,
                    coordinates: d.coordinates,
                })
                .collect(),
        }
    }
}
