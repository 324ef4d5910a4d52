//! Rendering of a decoded image: human-readable blocks and tables, or JSON.

use std::path::Path;

use anyhow::Context;
use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use pescope::{OptionalHeader, PeImage};

/// Well-known machine types, for display only; unknown values render numerically.
fn machine_name(machine: u16) -> Option<&'static str> {
    match machine {
        0x014C => Some("i386"),
        0x01C4 => Some("armnt"),
        0x0200 => Some("ia64"),
        0x8664 => Some("x64"),
        0xAA64 => Some("arm64"),
        _ => None,
    }
}

/// Well-known subsystem values, for display only.
fn subsystem_name(subsystem: u16) -> Option<&'static str> {
    match subsystem {
        1 => Some("native"),
        2 => Some("windows gui"),
        3 => Some("windows console"),
        7 => Some("posix console"),
        9 => Some("windows ce gui"),
        10 => Some("efi application"),
        11 => Some("efi boot service driver"),
        12 => Some("efi runtime driver"),
        13 => Some("efi rom"),
        14 => Some("xbox"),
        16 => Some("windows boot application"),
        _ => None,
    }
}

/// Conventional names of the data-directory slots, by index.
fn directory_name(index: usize) -> &'static str {
    const NAMES: [&str; 16] = [
        "export",
        "import",
        "resource",
        "exception",
        "security",
        "basereloc",
        "debug",
        "architecture",
        "globalptr",
        "tls",
        "load config",
        "bound import",
        "iat",
        "delay import",
        "com descriptor",
        "reserved",
    ];
    NAMES.get(index).copied().unwrap_or("unknown")
}

fn hex(value: impl Into<u64>) -> String {
    format!("0x{:X}", value.into())
}

#[derive(Debug, Serialize)]
struct DosView {
    e_lfanew: String,
}

#[derive(Debug, Serialize)]
struct CoffView {
    machine: String,
    number_of_sections: u16,
    time_date_stamp: u32,
    pointer_to_symbol_table: String,
    number_of_symbols: u32,
    size_of_optional_header: u16,
    characteristics: String,
}

#[derive(Debug, Serialize)]
struct OptionalView {
    magic: String,
    format: String,
    address_of_entry_point: String,
    image_base: String,
    subsystem: String,
    dll_characteristics: String,
    number_of_rva_and_sizes: u32,
}

#[derive(Debug, Serialize)]
struct DirectoryView {
    index: usize,
    name: &'static str,
    virtual_address: String,
    size: u32,
}

#[derive(Debug, Serialize)]
struct SectionView {
    name: String,
    virtual_address: String,
    virtual_size: String,
    pointer_to_raw_data: String,
    size_of_raw_data: String,
    characteristics: String,
}

#[derive(Debug, Serialize)]
struct ImageView {
    file: String,
    dos: DosView,
    coff: CoffView,
    optional: OptionalView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    data_directories: Vec<DirectoryView>,
    sections: Vec<SectionView>,
    imported_modules: Vec<String>,
}

fn build_view(path: &Path, image: &PeImage) -> ImageView {
    let machine = match machine_name(image.coff.machine) {
        Some(name) => format!("{} ({name})", hex(image.coff.machine)),
        None => hex(image.coff.machine),
    };
    let subsystem = match subsystem_name(image.optional.subsystem()) {
        Some(name) => format!("{} ({name})", image.optional.subsystem()),
        None => image.optional.subsystem().to_string(),
    };

    ImageView {
        file: path.display().to_string(),
        dos: DosView {
            e_lfanew: hex(image.dos.e_lfanew),
        },
        coff: CoffView {
            machine,
            number_of_sections: image.coff.number_of_sections,
            time_date_stamp: image.coff.time_date_stamp,
            pointer_to_symbol_table: hex(image.coff.pointer_to_symbol_table),
            number_of_symbols: image.coff.number_of_symbols,
            size_of_optional_header: image.coff.size_of_optional_header,
            characteristics: hex(image.coff.characteristics.bits()),
        },
        optional: OptionalView {
            magic: hex(image.optional.magic()),
            format: match &image.optional {
                OptionalHeader::Pe32(_) => "PE32".to_string(),
                OptionalHeader::Pe32Plus(_) => "PE32+".to_string(),
            },
            address_of_entry_point: hex(image.optional.address_of_entry_point()),
            image_base: hex(image.optional.image_base()),
            subsystem,
            dll_characteristics: hex(image.optional.dll_characteristics().bits()),
            number_of_rva_and_sizes: image.optional.number_of_rva_and_sizes(),
        },
        data_directories: image
            .data_directories
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(index, entry)| DirectoryView {
                index,
                name: directory_name(index),
                virtual_address: hex(entry.virtual_address),
                size: entry.size,
            })
            .collect(),
        sections: image
            .sections
            .iter()
            .map(|section| SectionView {
                name: section.name_str(),
                virtual_address: hex(section.virtual_address),
                virtual_size: hex(section.virtual_size),
                pointer_to_raw_data: hex(section.pointer_to_raw_data),
                size_of_raw_data: hex(section.size_of_raw_data),
                characteristics: hex(section.characteristics.bits()),
            })
            .collect(),
        imported_modules: image.imported_modules.clone(),
    }
}

/// Print the decoded image as pretty-printed JSON.
pub fn print_json(path: &Path, image: &PeImage) -> anyhow::Result<()> {
    let view = build_view(path, image);
    let json = serde_json::to_string_pretty(&view).context("failed to serialize image")?;
    println!("{json}");
    Ok(())
}

/// Print the decoded image as human-readable header blocks and tables.
pub fn print_pretty(path: &Path, image: &PeImage) {
    let view = build_view(path, image);

    println!("File: {}", view.file);
    println!("Format: {}", view.optional.format);
    println!();

    println!("DOS header");
    println!("  e_lfanew:           {}", view.dos.e_lfanew);
    println!();

    println!("COFF file header");
    println!("  machine:            {}", view.coff.machine);
    println!("  sections:           {}", view.coff.number_of_sections);
    println!("  time date stamp:    {}", view.coff.time_date_stamp);
    println!("  symbol table:       {}", view.coff.pointer_to_symbol_table);
    println!("  symbols:            {}", view.coff.number_of_symbols);
    println!("  optional hdr size:  {}", view.coff.size_of_optional_header);
    println!("  characteristics:    {}", view.coff.characteristics);
    println!();

    println!("Optional header");
    println!("  magic:              {}", view.optional.magic);
    println!("  entry point:        {}", view.optional.address_of_entry_point);
    println!("  image base:         {}", view.optional.image_base);
    println!("  subsystem:          {}", view.optional.subsystem);
    println!("  dll flags:          {}", view.optional.dll_characteristics);
    println!("  rva and sizes:      {}", view.optional.number_of_rva_and_sizes);
    println!();

    if !view.data_directories.is_empty() {
        println!("Data directories ({} non-empty):", view.data_directories.len());
        let mut table = new_table(&["#", "Name", "RVA", "Size"]);
        for entry in &view.data_directories {
            table.add_row(vec![
                entry.index.to_string(),
                entry.name.to_string(),
                entry.virtual_address.clone(),
                entry.size.to_string(),
            ]);
        }
        println!("{table}");
        println!();
    }

    println!("Sections ({}):", view.sections.len());
    let mut table = new_table(&["Name", "VirtAddr", "VirtSize", "RawPtr", "RawSize", "Flags"]);
    for section in &view.sections {
        table.add_row(vec![
            section.name.clone(),
            section.virtual_address.clone(),
            section.virtual_size.clone(),
            section.pointer_to_raw_data.clone(),
            section.size_of_raw_data.clone(),
            section.characteristics.clone(),
        ]);
    }
    println!("{table}");
    println!();

    if view.imported_modules.is_empty() {
        println!("No imported modules.");
    } else {
        println!("Imported modules ({}):", view.imported_modules.len());
        for module in &view.imported_modules {
            println!("  {module}");
        }
    }
}

/// Hex-dump the leading bytes of the named section.
pub fn dump_section(image: &PeImage, data: &[u8], name: &str) -> anyhow::Result<()> {
    let section = image
        .section_by_name(name)
        .with_context(|| format!("no section named {name:?}"))?;
    let raw = image
        .section_data(data, section)
        .with_context(|| format!("section {name:?} raw data lies outside the file"))?;

    let shown = raw.len().min(256);
    println!(
        "{} @ file offset 0x{:X}, {} byte(s), showing {}",
        name, section.pointer_to_raw_data, raw.len(), shown
    );
    for (row, chunk) in raw[..shown].chunks(16).enumerate() {
        let offset = section.pointer_to_raw_data as usize + row * 16;
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        let text: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    char::from(b)
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {offset:08X}  {:<47}  {text}", bytes.join(" "));
    }
    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    for (index, column) in table.column_iter_mut().enumerate() {
        // Name columns left-aligned, numeric columns right-aligned.
        if index >= 1 {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}
