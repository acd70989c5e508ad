//! Watershed segmentation regression test
//!
//! 1. Two bright blocks separated by a one-pixel dark gap, flooded from the
//!    maxima: exactly two basins, the gap stays on the watershed line.
//! 2. Two smooth sine/cosine reliefs flooded from the minima: one basin per
//!    minimum, a complete tessellation without lines, and agreement with
//!    the marker-driven watershed seeded by the same minima.
//!
//! Run with:
//! ```
//! cargo test -p cellseg-region --test watershed_reg
//! ```

use cellseg_core::{Connectivity, Pix};
use cellseg_region::{
    ExtremaOptions, FloodOrder, WatershedOptions, constrained_watershed, find_local_minima,
    label_regional_extrema, watershed,
};
use cellseg_test::{RegParams, pix_with_blocks, synthetic_wave};

fn do_watershed(rp: &mut RegParams, pixs: &Pix) {
    let w = pixs.width();
    let h = pixs.height();

    let minima = find_local_minima(pixs, Connectivity::EightWay).expect("find_local_minima");
    eprintln!("  Local minima: {}", minima.len());
    rp.check(minima.len() > 1, "wave relief has several minima");

    // Flooding from the minima, one basin per minimum
    let options = WatershedOptions::new();
    let basins = watershed(pixs, &options).expect("watershed");
    rp.compare_values(w as f64, basins.labels.width() as f64, 0.0);
    rp.compare_values(h as f64, basins.labels.height() as f64, 0.0);
    rp.compare_values(32.0, basins.labels.depth().bits() as f64, 0.0);
    rp.compare_values(minima.len() as f64, basins.count as f64, 0.0);

    let lines = basins.labels.values().iter().filter(|&&l| l == 0).count();
    eprintln!("  Basins: {}, line pixels: {}", basins.count, lines);
    rp.check(
        lines > 0 && lines < (w * h) as usize,
        "some but not all pixels lie on lines",
    );

    // Every minimum seeds the basin holding it
    for (i, &(x, y)) in minima.iter().enumerate() {
        rp.compare_values(
            (i + 1) as f64,
            basins.labels.get_pixel(x, y).unwrap_or(0) as f64,
            0.0,
        );
    }

    // Without lines every pixel is claimed
    let tessellation = watershed(pixs, &options.clone().with_lines(false)).expect("watershed");
    rp.check(
        tessellation.labels.values().iter().all(|&l| l > 0),
        "lines=false leaves no unlabeled pixel",
    );
    rp.compare_values(basins.count as f64, tessellation.count as f64, 0.0);

    // The same flood driven by explicit markers
    let markers = label_regional_extrema(pixs, &ExtremaOptions::new()).expect("extrema");
    let constrained =
        constrained_watershed(pixs, &markers.labels, &options).expect("constrained_watershed");
    rp.compare_partitions(&basins.labels, &constrained.labels);
}

#[test]
fn watershed_synthetic() {
    let mut rp = RegParams::new("watershed");

    eprintln!("=== Synthetic image 1 ===");
    let pix1 = synthetic_wave(500, 0).expect("wave");
    do_watershed(&mut rp, &pix1);

    eprintln!("=== Synthetic image 2 ===");
    let pix2 = synthetic_wave(500, 1).expect("wave");
    do_watershed(&mut rp, &pix2);

    assert!(rp.cleanup(), "watershed regression test failed");
}

#[test]
fn watershed_two_blobs() {
    let mut rp = RegParams::new("watershed_blobs");

    // Two 5x5 blocks of 200, one dark column between them
    let pix = pix_with_blocks(13, 7, 0, &[(1, 1, 5, 5, 200), (7, 1, 5, 5, 200)]).expect("blocks");
    let options = WatershedOptions::new().with_order(FloodOrder::Descending);
    let basins = watershed(&pix, &options).expect("watershed");
    rp.show("blobs", &basins.labels);

    rp.compare_values(2.0, basins.count as f64, 0.0);
    let left = basins.labels.get_pixel(3, 3).unwrap_or(0);
    let right = basins.labels.get_pixel(9, 3).unwrap_or(0);
    rp.check(left > 0 && right > 0 && left != right, "blocks get distinct labels");
    for y in 1..6 {
        rp.compare_values(0.0, basins.labels.get_pixel(6, y).unwrap_or(99) as f64, 0.0);
    }
    // The blocks keep their own label throughout
    for y in 1..6 {
        for x in 1..6 {
            rp.compare_values(left as f64, basins.labels.get_pixel(x, y).unwrap_or(0) as f64, 0.0);
            rp.compare_values(
                right as f64,
                basins.labels.get_pixel(x + 6, y).unwrap_or(0) as f64,
                0.0,
            );
        }
    }

    assert!(rp.cleanup(), "watershed_blobs regression test failed");
}

#[test]
fn watershed_hex_grid() {
    let mut rp = RegParams::new("watershed_hex");

    let pix = synthetic_wave(64, 1).expect("wave");
    let options = WatershedOptions::new().with_connectivity(Connectivity::SixWay);
    let basins = watershed(&pix, &options).expect("watershed");
    let minima = find_local_minima(&pix, Connectivity::SixWay).expect("minima");
    rp.compare_values(minima.len() as f64, basins.count as f64, 0.0);

    assert!(rp.cleanup(), "watershed_hex regression test failed");
}
