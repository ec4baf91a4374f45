//! Export helpers
//!
//! Debug/report output for drivers and tools: grayscale and biome-banded PNG
//! maps of the height field, plus a plain-text world report. Nothing here is
//! consulted by the simulation itself.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::error::WorldError;
use crate::heightfield::HeightGrid;
use crate::terrain::ElevationBand;
use crate::world::WorldOrchestrator;

/// Write the height grid as a grayscale PNG, normalized to the grid's range.
pub fn export_height_png(grid: &HeightGrid, path: impl AsRef<Path>) -> Result<(), WorldError> {
    let side = (grid.resolution() + 1) as u32;
    let range = (grid.max_height() - grid.min_height()).max(1e-6);

    let img = GrayImage::from_fn(side, side, |x, y| {
        let h = grid.sample(x as usize, y as usize);
        let v = ((h - grid.min_height()) / range * 255.0).clamp(0.0, 255.0) as u8;
        Luma([v])
    });

    img.save(path).map_err(|e| WorldError::Export(e.to_string()))
}

/// Write the height grid as a biome-banded color PNG.
pub fn export_band_png(grid: &HeightGrid, path: impl AsRef<Path>) -> Result<(), WorldError> {
    let side = (grid.resolution() + 1) as u32;

    let img = RgbImage::from_fn(side, side, |x, y| {
        let h = grid.sample(x as usize, y as usize);
        let (r, g, b) = ElevationBand::classify(h).color();
        Rgb([r, g, b])
    });

    img.save(path).map_err(|e| WorldError::Export(e.to_string()))
}

/// Write a plain-text report: seeds, terrain stats, per-area population, and
/// the tail of the world log.
pub fn write_world_report(
    world: &WorldOrchestrator,
    path: impl AsRef<Path>,
) -> Result<(), WorldError> {
    let mut file = File::create(path)?;
    let grid = world.height_field().snapshot();

    writeln!(file, "World report")?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "{}", world.seeds())?;
    writeln!(file, "Tick: {}", world.tick())?;
    writeln!(file)?;
    writeln!(
        file,
        "Terrain: {}x{} samples over {:.0} units, elevation {:.1} .. {:.1}",
        grid.resolution() + 1,
        grid.resolution() + 1,
        grid.world_size(),
        grid.min_height(),
        grid.max_height()
    )?;
    writeln!(file)?;

    writeln!(file, "Areas ({}):", world.registry().len())?;
    for area in world.registry().iter() {
        writeln!(
            file,
            "  {} '{}' [{:?}/{:?}, weather {:?}]: {} live across {} pools",
            area.id(),
            area.name(),
            area.descriptor().faction,
            area.descriptor().biome,
            area.weather(),
            area.live_count(),
            area.pools().count(),
        )?;
        for pool in area.pools() {
            let d = pool.definition();
            writeln!(
                file,
                "    {} '{}' lvl {} ({}): {}/{} live, respawn {:.0}s",
                d.kind.label(),
                d.subtype,
                d.level,
                d.pattern.label(),
                pool.live_count(),
                d.max_count,
                d.respawn_time,
            )?;
        }
    }
    writeln!(file)?;

    writeln!(file, "Recent log:")?;
    for entry in world.log().recent(20) {
        writeln!(file, "  [{:>5}] {} {}", entry.tick, entry.category.label(), entry.message)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::SequentialFactory;
    use crate::heightfield::{HeightField, HeightFieldParams};
    use crate::seeds::WorldSeeds;
    use crate::spawn::ContentTables;

    fn small_grid() -> HeightField {
        HeightField::generate(
            HeightFieldParams {
                world_size: 128.0,
                resolution: 8,
                ..HeightFieldParams::default()
            },
            21,
        )
    }

    #[test]
    fn test_export_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let field = small_grid();
        let grid = field.snapshot();

        export_height_png(&grid, dir.path().join("height.png")).unwrap();
        export_band_png(&grid, dir.path().join("bands.png")).unwrap();

        assert!(dir.path().join("height.png").exists());
        assert!(dir.path().join("bands.png").exists());
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let world = WorldOrchestrator::new(
            HeightFieldParams {
                world_size: 128.0,
                resolution: 8,
                ..HeightFieldParams::default()
            },
            WorldSeeds::from_master(3),
            ContentTables::new(),
            Box::new(SequentialFactory::new()),
        );

        let path = dir.path().join("report.txt");
        write_world_report(&world, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("World report"));
        assert!(text.contains("Terrain:"));
    }
}
