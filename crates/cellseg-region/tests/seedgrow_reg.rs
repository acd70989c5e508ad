//! Seeded region regression test
//!
//! 1. Two seeds four pixels apart on a flat image: the equidistant column
//!    becomes a contour, each side is claimed by its own seed.
//! 2. Intensity-driven growing with a cost ceiling stays on its plateau.
//! 3. Round-based expansion and boundary shrinking of block regions.
//!
//! Run with:
//! ```
//! cargo test -p cellseg-region --test seedgrow_reg
//! ```

use cellseg_core::{Pix, PixelDepth};
use cellseg_region::{
    ContourPolicy, ExpandOptions, GrowOptions, MeanDifference, ShrinkOptions, UniformCost,
    expand_regions, grow_regions, region_stats, shrink_regions,
};
use cellseg_test::{RegParams, pix_with_blocks};

fn seed_raster(width: u32, height: u32, points: &[(u32, u32, u32)]) -> Pix {
    let mut values = vec![0; (width * height) as usize];
    for &(x, y, label) in points {
        values[(y * width + x) as usize] = label;
    }
    Pix::from_values(width, height, PixelDepth::Bit32, &values).expect("seeds")
}

fn count(pix: &Pix, label: u32) -> usize {
    pix.values().iter().filter(|&&l| l == label).count()
}

#[test]
fn seedgrow_midline() {
    let mut rp = RegParams::new("seedgrow_midline");

    let pix = pix_with_blocks(9, 5, 100, &[]).expect("flat");
    let seeds = seed_raster(9, 5, &[(2, 2, 1), (6, 2, 2)]);

    let out = grow_regions(&pix, &seeds, &GrowOptions::new(), |_| UniformCost::new())
        .expect("grow_regions");
    rp.show("midline", &out.labels);
    rp.compare_values(2.0, out.count as f64, 0.0);
    for y in 0..5 {
        rp.compare_values(0.0, out.labels.get_pixel(4, y).unwrap_or(9) as f64, 0.0);
        for x in 0..4 {
            rp.compare_values(1.0, out.labels.get_pixel(x, y).unwrap_or(0) as f64, 0.0);
            rp.compare_values(2.0, out.labels.get_pixel(x + 5, y).unwrap_or(0) as f64, 0.0);
        }
    }

    // Without contours the column goes to the first region that reached it
    let opts = GrowOptions::new().with_policy(ContourPolicy::CompleteGrow);
    let full = grow_regions(&pix, &seeds, &opts, |_| UniformCost::new()).expect("grow_regions");
    rp.compare_values(0.0, count(&full.labels, 0) as f64, 0.0);
    rp.compare_values(25.0, count(&full.labels, 1) as f64, 0.0);
    rp.compare_values(20.0, count(&full.labels, 2) as f64, 0.0);

    // One round claims exactly the 8-neighborhood of each seed
    let opts = GrowOptions::new().with_max_rounds(1);
    let near = grow_regions(&pix, &seeds, &opts, |_| UniformCost::new()).expect("grow_regions");
    rp.compare_values(9.0, count(&near.labels, 1) as f64, 0.0);
    rp.compare_values(9.0, count(&near.labels, 2) as f64, 0.0);

    assert!(rp.cleanup(), "seedgrow_midline regression test failed");
}

#[test]
fn seedgrow_cost_ceiling() {
    let mut rp = RegParams::new("seedgrow_ceiling");

    // Dark left half, bright right half, one seed on the dark side
    let pix = pix_with_blocks(10, 4, 10, &[(5, 0, 5, 4, 200)]).expect("blocks");
    let seeds = seed_raster(10, 4, &[(0, 0, 1)]);

    let opts = GrowOptions::new().with_max_cost(50.0);
    let out = grow_regions(&pix, &seeds, &opts, |_| MeanDifference::new()).expect("grow");
    rp.compare_values(20.0, count(&out.labels, 1) as f64, 0.0);
    for y in 0..4 {
        rp.compare_values(0.0, out.labels.get_pixel(5, y).unwrap_or(9) as f64, 0.0);
    }

    // Without the ceiling the single region eventually takes everything
    let out = grow_regions(&pix, &seeds, &GrowOptions::new(), |_| MeanDifference::new())
        .expect("grow");
    rp.compare_values(40.0, count(&out.labels, 1) as f64, 0.0);

    // A negative ceiling is rejected
    let bad = GrowOptions::new().with_max_cost(-1.0);
    rp.check(
        grow_regions(&pix, &seeds, &bad, |_| MeanDifference::new()).is_err(),
        "negative max_cost rejected",
    );

    assert!(rp.cleanup(), "seedgrow_ceiling regression test failed");
}

#[test]
fn seedgrow_expand_shrink() {
    let mut rp = RegParams::new("seedgrow_expand_shrink");

    // Two seeds on one row meet in the middle on the second round
    let seeds = seed_raster(9, 1, &[(2, 0, 1), (6, 0, 2)]);
    let opts = ExpandOptions::new().with_expansion_rounds(2);
    let out = expand_regions(&seeds, None, &opts).expect("expand");
    rp.check(
        out.labels.values() == vec![1, 1, 1, 1, 0, 2, 2, 2, 2],
        "row expansion leaves a contour at x = 4",
    );

    // A lone seed grows a diamond, then a square: 21 pixels after two rounds
    let seeds = seed_raster(9, 9, &[(4, 4, 5)]);
    let out = expand_regions(&seeds, None, &opts).expect("expand");
    rp.compare_values(21.0, count(&out.labels, 5) as f64, 0.0);
    let stats = region_stats(&out.labels).expect("stats");
    rp.compare_values(1.0, stats.len() as f64, 0.0);
    rp.compare_values(4.0, stats[0].centroid_x, 1e-9);
    rp.compare_values(4.0, stats[0].centroid_y, 1e-9);

    // Two 5x5 regions peel to 3x3, then to their centers, then stop
    let labels = pix_with_blocks(13, 7, 0, &[(1, 1, 5, 5, 1), (7, 1, 5, 5, 2)]).expect("blocks");
    let once = shrink_regions(&labels, &ShrinkOptions::new()).expect("shrink");
    rp.compare_values(9.0, count(&once.labels, 1) as f64, 0.0);
    rp.compare_values(9.0, count(&once.labels, 2) as f64, 0.0);
    let many = shrink_regions(&labels, &ShrinkOptions::new().with_rounds(5)).expect("shrink");
    rp.compare_values(1.0, count(&many.labels, 1) as f64, 0.0);
    rp.compare_values(1.0, many.labels.get_pixel(3, 3).unwrap_or(0) as f64, 0.0);
    rp.compare_values(2.0, many.labels.get_pixel(9, 3).unwrap_or(0) as f64, 0.0);
    rp.compare_values(2.0, many.count as f64, 0.0);

    assert!(rp.cleanup(), "seedgrow_expand_shrink regression test failed");
}
