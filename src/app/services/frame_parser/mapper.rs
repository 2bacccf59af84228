//! Positional section mapping and device-type dispatch
//!
//! Second stage of decoding: project each device type's fixed
//! (section letter, position) table onto the section map produced by the
//! splitter. Mapping is pure and total; every index access is bound-checked
//! and a missing token yields a null field, never an error. The only failure
//! in this module is the string-typed dispatch rejecting an unsupported
//! device type label.

use crate::app::models::{
    DeviceType, Flow, Metadata, ParsedRecord, Pressure, SectionMap, Settings, TokenValue,
    Ventilation,
};
use crate::Result;

use super::splitter::split_frame;

/// Bound-checked positional field lookup
fn field(sections: &SectionMap, letter: char, index: usize) -> Option<TokenValue> {
    sections.token(letter, index).cloned()
}

/// Verbatim copy of a section's token array, if the section is present
fn passthrough(sections: &SectionMap, letter: char) -> Option<Vec<TokenValue>> {
    sections.get(letter).map(|values| values.to_vec())
}

/// Map CPAP sections (S, G, H, I) onto named field groups
pub fn map_cpap(sections: SectionMap) -> ParsedRecord {
    let metadata = sections.contains('S').then(|| Metadata {
        date: field(&sections, 'S', 0),
        time: field(&sections, 'S', 1),
    });

    let pressure = sections.contains('G').then(|| Pressure {
        ipap: field(&sections, 'G', 0),
        ramp: field(&sections, 'G', 1),
    });

    let flow = sections.contains('H').then(|| Flow {
        max_flow: field(&sections, 'H', 0),
        min_flow: field(&sections, 'H', 1),
        backup_rate: field(&sections, 'H', 2),
        mode: field(&sections, 'H', 3),
    });

    let settings = sections.contains('I').then(|| settings_group(&sections, 'I'));

    ParsedRecord {
        metadata,
        pressure,
        flow,
        settings,
        sections,
        ..Default::default()
    }
}

/// Map BIPAP sections (S, A, B, C, D, E, F) onto named field groups
///
/// Sections C, D and E carry no positional field names; their token arrays
/// pass through whole.
pub fn map_bipap(sections: SectionMap) -> ParsedRecord {
    let metadata = sections.contains('S').then(|| Metadata {
        date: field(&sections, 'S', 0),
        time: field(&sections, 'S', 1),
    });

    let pressure = sections.contains('A').then(|| Pressure {
        ipap: field(&sections, 'A', 0),
        ramp: field(&sections, 'A', 1),
    });

    let ventilation = sections.contains('B').then(|| Ventilation {
        ipap: field(&sections, 'B', 0),
        epap: field(&sections, 'B', 1),
        backup_rate: field(&sections, 'B', 2),
        tidal_volume: field(&sections, 'B', 3),
        insp_time: field(&sections, 'B', 4),
        rise_time: field(&sections, 'B', 5),
        trigger: field(&sections, 'B', 6),
        mode: field(&sections, 'B', 7),
    });

    let section_c = passthrough(&sections, 'C');
    let section_d = passthrough(&sections, 'D');
    let section_e = passthrough(&sections, 'E');

    let settings = sections.contains('F').then(|| settings_group(&sections, 'F'));

    ParsedRecord {
        metadata,
        pressure,
        ventilation,
        section_c,
        section_d,
        section_e,
        settings,
        sections,
        ..Default::default()
    }
}

/// Shared 7-field settings layout (CPAP section I, BIPAP section F)
fn settings_group(sections: &SectionMap, letter: char) -> Settings {
    Settings {
        humidity: field(sections, letter, 0),
        temperature: field(sections, letter, 1),
        tube_type: field(sections, letter, 2),
        mask_type: field(sections, letter, 3),
        trigger: field(sections, letter, 4),
        cycle: field(sections, letter, 5),
        mode: field(sections, letter, 6),
    }
}

/// Decode a frame for a known device type
///
/// Total function: any string decodes to a record, however sparse.
pub fn parse_frame(frame: &str, device_type: DeviceType) -> ParsedRecord {
    let sections = split_frame(frame);
    match device_type {
        DeviceType::Cpap => map_cpap(sections),
        DeviceType::Bipap => map_bipap(sections),
    }
}

/// Decode a frame for a caller-supplied device type label
///
/// This is the ingestion-facing entry point. Fails with
/// [`crate::Error::UnknownDeviceType`] for any label other than `CPAP` or
/// `BIPAP`; that is the parser's only error condition.
pub fn parse_device_data(device_data: &str, device_type: &str) -> Result<ParsedRecord> {
    let device_type: DeviceType = device_type.parse()?;
    Ok(parse_frame(device_data, device_type))
}
