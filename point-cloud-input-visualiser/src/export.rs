/// Whitespace-delimited point table writers for CloudCompare style viewers.
use crate::dataset::PointTable;
use crate::error::Result;
use constants::class::label_colour;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write one row per line, values separated by single spaces.
pub fn write_rows<W, I>(writer: &mut W, rows: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut written = 0;
    for row in rows {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
        written += 1;
    }
    Ok(written)
}

fn write_file<I>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_rows(&mut writer, rows)?;
    writer.flush()?;
    Ok(written)
}

/// Rows `x y z [r g b] density`, optionally only for points with a
/// positive density.
pub fn density_rows<'a>(
    scene: &'a PointTable,
    density: &'a [f64],
    cleaned: bool,
) -> impl Iterator<Item = Vec<f64>> + 'a {
    density
        .iter()
        .enumerate()
        .filter(move |(_, d)| !cleaned || **d > 0.0)
        .map(move |(i, &d)| {
            let mut row = scene.row(i);
            row.push(d);
            row
        })
}

pub fn write_density_table(
    path: &Path,
    scene: &PointTable,
    density: &[f64],
    cleaned: bool,
) -> Result<usize> {
    write_file(path, density_rows(scene, density, cleaned))
}

pub fn write_seeds(path: &Path, seeds: &[usize]) -> Result<usize> {
    write_file(path, seeds.iter().map(|&s| vec![s as f64]))
}

/// 0-1 colour to an integer channel, truncating like an integer cast
fn colour_channel(value: f32) -> f64 {
    (255.0 * value).clamp(0.0, 255.0).floor() as f64
}

/// Rows `x y z r g b` with the cloud's own colour, black when it has none.
pub fn true_colour_rows(cloud: &PointTable) -> impl Iterator<Item = Vec<f64>> + '_ {
    cloud.positions.iter().enumerate().map(move |(i, p)| {
        let c = cloud.colours.as_ref().map_or([0.0; 3], |c| c[i]);
        vec![
            p[0],
            p[1],
            p[2],
            colour_channel(c[0]),
            colour_channel(c[1]),
            colour_channel(c[2]),
        ]
    })
}

/// Rows `x y z r g b` coloured by class label.
pub fn label_colour_rows<'a>(
    cloud: &'a PointTable,
    labels: &'a [u8],
) -> impl Iterator<Item = Vec<f64>> + 'a {
    cloud.positions.iter().zip(labels).map(|(p, &label)| {
        let c = label_colour(label as usize);
        vec![p[0], p[1], p[2], c[0] as f64, c[1] as f64, c[2] as f64]
    })
}

pub fn write_true_colour_cloud(path: &Path, cloud: &PointTable) -> Result<usize> {
    write_file(path, true_colour_rows(cloud))
}

pub fn write_label_colour_cloud(path: &Path, cloud: &PointTable, labels: &[u8]) -> Result<usize> {
    write_file(path, label_colour_rows(cloud, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<I: IntoIterator<Item = Vec<f64>>>(rows: I) -> String {
        let mut out = Vec::new();
        write_rows(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cleaned_table_drops_unselected_points() {
        let scene = PointTable::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.5, 0.0]],
            None,
        );
        let density = [0.5, 0.0, 0.5];
        assert_eq!(
            render(density_rows(&scene, &density, false)),
            "0 0 0 0.5\n1 0 0 0\n2 0.5 0 0.5\n"
        );
        assert_eq!(
            render(density_rows(&scene, &density, true)),
            "0 0 0 0.5\n2 0.5 0 0.5\n"
        );
    }

    #[test]
    fn true_colour_truncates_and_defaults_to_black() {
        let coloured = PointTable::new(vec![[1.0, 2.0, 3.0]], Some(vec![[1.0, 0.5, 0.999]]));
        assert_eq!(render(true_colour_rows(&coloured)), "1 2 3 255 127 254\n");

        let plain = PointTable::new(vec![[1.0, 2.0, 3.0]], None);
        assert_eq!(render(true_colour_rows(&plain)), "1 2 3 0 0 0\n");
    }

    #[test]
    fn label_colours_come_from_class_table() {
        let cloud = PointTable::new(vec![[0.0, 0.0, 0.0]], None);
        let c = label_colour(5);
        assert_eq!(
            render(label_colour_rows(&cloud, &[5])),
            format!("0 0 0 {} {} {}\n", c[0], c[1], c[2])
        );
    }

    #[test]
    fn seeds_are_written_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        assert_eq!(write_seeds(&path, &[4, 0, 4]).unwrap(), 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4\n0\n4\n");
    }
}
