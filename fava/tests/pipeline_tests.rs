use fava::fava_input::{DataType, ExpressionMatrix};
use fava::fava_output::write_pairs;
use fava::fit_fava::{cook, FavaConfig};
use fava::pair_similarity::CorrelationType;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

fn random_data(nrow: usize, ncol: usize, seed: u64) -> anyhow::Result<ExpressionMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mat = Array2::from_shape_fn((nrow, ncol), |_| rng.random_range(0f32..10f32));
    let labels = (0..nrow).map(|i| format!("E{}", i).into_boxed_str()).collect();
    ExpressionMatrix::new(labels, mat)
}

fn quick_config() -> FavaConfig {
    FavaConfig {
        epochs: 1,
        batch_size: 4,
        interaction_count: 20,
        seed: Some(42),
        ..FavaConfig::default()
    }
}

fn assert_sorted_and_bounded(table: &fava::pair_similarity::PairTable) {
    let scores = table.scores();
    assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(table.named_pairs().all(|(a, b, _)| a != b));
}

#[test]
fn end_to_end_small_matrix() -> anyhow::Result<()> {
    let data = random_data(10, 20, 1)?;
    let table = cook(&data, &quick_config())?;

    assert!(!table.is_empty());
    assert!(table.len() <= 20);
    assert_sorted_and_bounded(&table);
    Ok(())
}

#[test]
fn count_semantics() -> anyhow::Result<()> {
    let data = random_data(6, 12, 2)?;

    let table = cook(&data, &FavaConfig { interaction_count: 7, ..quick_config() })?;
    assert_eq!(table.len(), 7);

    let table = cook(&data, &FavaConfig { interaction_count: 1000, ..quick_config() })?;
    assert_eq!(table.len(), 6 * 6 - 6);
    Ok(())
}

#[test]
fn cutoff_takes_precedence() -> anyhow::Result<()> {
    let data = random_data(8, 15, 3)?;

    let full = cook(&data, &FavaConfig { interaction_count: 1000, ..quick_config() })?;
    let min_score = full
        .scores()
        .into_iter()
        .fold(f64::INFINITY, f64::min);

    let config = FavaConfig {
        correlation_cutoff: Some(min_score),
        interaction_count: 1,
        ..quick_config()
    };
    let same = cook(&data, &config)?;
    assert_eq!(same.len(), 8 * 8 - 8);

    let config = FavaConfig {
        correlation_cutoff: Some(1.1),
        ..quick_config()
    };
    assert!(cook(&data, &config)?.is_empty());
    Ok(())
}

#[test]
fn seeded_runs_repeat() -> anyhow::Result<()> {
    let data = random_data(10, 20, 4)?;
    let config = FavaConfig {
        correlation_type: CorrelationType::Spearman,
        ..quick_config()
    };
    let a = cook(&data, &config)?;
    let b = cook(&data, &config)?;
    assert_eq!(a.pairs, b.pairs);
    assert_sorted_and_bounded(&a);
    Ok(())
}

#[test]
fn outlier_label_follows_its_row() -> anyhow::Result<()> {
    let (nrow, ncol, odd) = (10, 20, 6);

    // rescaled copies of one ramp normalize to the same profile
    let mat = Array2::from_shape_fn((nrow, ncol), |(i, j)| {
        if i == odd {
            if j < 5 { 8.0 } else { 0.0 }
        } else {
            (1 + i) as f32 * j as f32 + i as f32
        }
    });
    let labels = (0..nrow).map(|i| format!("E{}", i).into_boxed_str()).collect();
    let data = ExpressionMatrix::new(labels, mat)?;

    let config = FavaConfig {
        log2_normalization: false,
        latent_dim: Some(8),
        interaction_count: 1000,
        ..quick_config()
    };
    let table = cook(&data, &config)?;
    assert_eq!(table.len(), nrow * nrow - nrow);

    let (a, b, _) = table
        .named_pairs()
        .last()
        .ok_or(anyhow::anyhow!("empty table"))?;
    assert!(a == "E6" || b == "E6", "lowest pair: {} {}", a, b);

    let (a, b, _) = table
        .named_pairs()
        .next()
        .ok_or(anyhow::anyhow!("empty table"))?;
    assert!(a != "E6" && b != "E6", "top pair: {} {}", a, b);
    Ok(())
}

#[test]
fn batch_size_beyond_entities_fails() -> anyhow::Result<()> {
    let data = random_data(3, 10, 6)?;
    let config = FavaConfig { batch_size: 4, ..quick_config() };
    assert!(cook(&data, &config).is_err());
    Ok(())
}

#[test]
fn file_to_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.csv");

    let data = random_data(6, 8, 7)?;
    {
        let mut f = std::fs::File::create(&input)?;
        let header: Vec<String> = (0..8).map(|j| format!("s{}", j)).collect();
        writeln!(f, "id,{}", header.join(","))?;
        for (label, row) in data.labels().iter().zip(data.mat().rows()) {
            let vals: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{},{}", label, vals.join(","))?;
        }
    }

    let input = input.to_string_lossy().to_string();
    let read_back = ExpressionMatrix::from_file(&input, DataType::Csv)?;
    assert_eq!(read_back.labels(), data.labels());
    assert_eq!(read_back.num_samples(), 8);

    let table = cook(&read_back, &FavaConfig { interaction_count: 10, ..quick_config() })?;

    let output = dir.path().join("out/pairs.txt.gz");
    let output = output.to_string_lossy().to_string();
    write_pairs(&table, &output, Some(5))?;

    let lines = matrix_util::common_io::read_lines_of_words_delim(&output, ' ', -1)?.lines;
    assert_eq!(lines.len(), table.len());
    for (words, (a, b, score)) in lines.iter().zip(table.named_pairs()) {
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].as_ref(), a);
        assert_eq!(words[1].as_ref(), b);
        let written: f64 = words[2].parse()?;
        assert!((written - score).abs() <= 5e-6);
    }
    Ok(())
}
