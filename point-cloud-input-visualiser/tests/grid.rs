mod common;

use common::scripted::{ScriptedDataset, square_batch, square_scene};
use indicatif::ProgressBar;
use input_visualiser::compositor::{BatchComposite, GridLayout, compose_batches};
use input_visualiser::dataset::Batch;

#[test]
fn ten_metre_scenes_get_twenty_five_metre_cells() {
    let mut dataset = ScriptedDataset::with_point_counts(&[1]);
    dataset.push_batch(square_batch(&[[100.0, -40.0], [7.0, 7.0]], 10.0, 9));
    dataset.push_batch(square_batch(&[[1.0, 1.0], [-5.0, 2.0]], 10.0, 0));
    dataset.push_batch(square_batch(&[[3.0, 4.0], [0.0, 0.0]], 10.0, 1));

    let (layout, composite) =
        compose_batches(&mut dataset, 2, 2, false, false, 15.0, &ProgressBar::hidden()).unwrap();

    assert_eq!(layout, GridLayout { xsize: 25.0, ysize: 25.0 });
    assert_eq!(layout.cell_origin(1, 1), [25.0, 25.0, 0.0]);

    let cell = composite
        .cell_bounds()
        .iter()
        .find(|c| c.batch == 1 && c.slot == 1)
        .unwrap();
    assert_eq!(cell.bounds.min_corner(), [25.0, 25.0, 0.0]);
    assert_eq!(composite.batch_count(), 2);
    assert_eq!(composite.len(), 16);
}

#[test]
fn probe_batch_only_sizes_the_grid() {
    let mut dataset = ScriptedDataset::with_point_counts(&[1]);
    dataset.push_batch(square_batch(&[[0.0, 0.0]], 4.0, 9));
    dataset.push_batch(square_batch(&[[0.0, 0.0]], 4.0, 1));

    let (_, composite) =
        compose_batches(&mut dataset, 1, 1, false, false, 15.0, &ProgressBar::hidden()).unwrap();

    assert!(composite.labels().iter().all(|&l| l == 1));
    assert!(dataset.batches.is_empty());
}

#[test]
fn cells_do_not_overlap() {
    let layout = GridLayout::from_extent(10.0, 10.0, 15.0);
    let mut composite = BatchComposite::new();
    for i in 0..3 {
        let batch = square_batch(&[[i as f64, -(i as f64)], [50.0, 50.0], [-8.0, 3.0]], 10.0, 0);
        composite.push_batch(i, &batch, &layout).unwrap();
    }

    let cells = composite.cell_bounds();
    assert_eq!(cells.len(), 9);
    for (a, first) in cells.iter().enumerate() {
        for second in &cells[a + 1..] {
            assert!(
                !first.bounds.overlaps_xy(&second.bounds),
                "cell ({}, {}) overlaps ({}, {})",
                first.batch,
                first.slot,
                second.batch,
                second.slot
            );
        }
    }
}

#[test]
fn points_and_labels_stay_parallel() {
    let layout = GridLayout::from_extent(10.0, 10.0, 15.0);
    let mut composite = BatchComposite::new();
    assert!(composite.is_empty());

    let uneven = Batch {
        scenes: vec![square_scene([0.0, 0.0], 10.0), square_scene([2.0, 2.0], 5.0)],
        labels: vec![vec![0, 1, 2, 3], vec![4, 4, 4, 4]],
        weights: Vec::new(),
    };
    for i in 0..2 {
        composite.push_batch(i, &uneven, &layout).unwrap();
        assert_eq!(composite.cloud().len(), composite.labels().len());
        assert_eq!(
            composite.cloud().colours.as_ref().map(Vec::len),
            Some(composite.labels().len())
        );
    }
    assert_eq!(&composite.labels()[..4], &[0, 1, 2, 3]);
}

#[test]
fn oversized_scene_is_placed_anyway() {
    let layout = GridLayout::from_extent(10.0, 10.0, 15.0);
    let placed = layout.reposition(&square_scene([3.0, 3.0], 40.0), 0, 1);
    assert_eq!(placed.bounds().unwrap().min_corner(), [25.0, 0.0, 0.0]);
}
