use super::error::CliError;
use oeigen::UnitSummary;
use oeigen::emit::OutputSinks;
use prettytable::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DECLARATIONS_FILE: &str = "oei_iclass.h";
pub const DEFINITIONS_FILE: &str = "oei_iclass.cu";
pub const ASSEMBLY_FILE: &str = "oei_assembler.h";
pub const GRADIENT_FILE: &str = "oei_grad_assembler.h";
pub const DEBUG_FILE: &str = "oei_debug.txt";

/// Writes every stream to its own file inside `dir` and returns the written paths.
pub fn write_sources(dir: &Path, sinks: &OutputSinks) -> Result<Vec<PathBuf>, CliError> {
    fs::create_dir_all(dir).map_err(|e| CliError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut streams = vec![
        (DECLARATIONS_FILE, sinks.declarations.as_str()),
        (DEFINITIONS_FILE, sinks.definitions.as_str()),
        (ASSEMBLY_FILE, sinks.assembly.as_str()),
        (GRADIENT_FILE, sinks.gradient.as_str()),
    ];
    if let Some(debug) = &sinks.debug {
        streams.push((DEBUG_FILE, debug.as_str()));
    }

    let mut written = Vec::with_capacity(streams.len());
    for (name, content) in streams {
        let path = dir.join(name);
        fs::write(&path, content).map_err(|e| CliError::Io {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_summary(
    mut writer: impl Write,
    summary: &[UnitSummary],
    written: &[PathBuf],
) -> Result<(), CliError> {
    let box_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let no_intern_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let total_classes: usize = summary.iter().map(|unit| unit.classes).sum();

    let mut overview = Table::new();
    overview.set_format(no_intern_format);
    overview.add_row(row![b->"Shell Pairs:", summary.len()]);
    overview.add_row(row![b->"Classes:", total_classes]);
    for path in written {
        overview.add_row(row![b->"Written:", path.display()]);
    }
    overview.print(&mut writer)?;
    writeln!(writer)?;

    let mut data_table = Table::new();
    data_table.set_format(box_format);
    data_table.set_titles(row![
        bc->"Pair",
        bc->"Strategy",
        bc->"Max m",
        bc->"Raise Side",
        bc->"Components",
        bc->"Classes"
    ]);
    for unit in summary {
        data_table.add_row(row![
            l->unit.pair,
            l->unit.strategy,
            r->unit.max_m,
            l->unit.side,
            r->unit.components,
            r->unit.classes
        ]);
    }
    data_table.print(&mut writer)?;

    Ok(())
}
