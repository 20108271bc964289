use rand::{rngs::StdRng, SeedableRng};

use ferrite_ocr::ocr::{classify, encode_grid};
use ferrite_ocr::{
    train_loop, BackPropagator, Grid, Network, NetworkSpec, TrainConfig, TrainingSample, TrainingSet,
};

fn drawn(cells: &[(usize, usize)]) -> Grid {
    let mut grid = Grid::default();
    for &(r, c) in cells {
        grid.set(r, c, true).unwrap();
    }
    grid
}

fn letter_set() -> TrainingSet {
    let mut set = TrainingSet::new();
    // Crude strokes: a top bar, a left bar, a diagonal and an empty grid.
    set.add(TrainingSample::new(drawn(&(0..8).map(|c| (0, c)).collect::<Vec<_>>()), Some('T')));
    set.add(TrainingSample::new(drawn(&(0..8).map(|r| (r, 0)).collect::<Vec<_>>()), Some('L')));
    set.add(TrainingSample::new(drawn(&(0..8).map(|i| (i, i)).collect::<Vec<_>>()), Some('N')));
    set.add(TrainingSample::new(Grid::default(), None));
    set
}

#[test]
fn learns_a_few_letters_end_to_end() {
    let set = letter_set();
    let spec = NetworkSpec::default();
    assert_eq!(spec.input_count, encode_grid(&Grid::default()).len());

    let mut learned = false;
    for seed in 0..8 {
        let mut network = Network::from_spec_with_rng(
            &NetworkSpec { hidden_count: 8, ..spec.clone() },
            &mut StdRng::seed_from_u64(seed),
        );
        {
            let mut trainer = BackPropagator::new(&mut network, spec.learning_rate);
            set.populate(&mut trainer).unwrap();
            let outcome = train_loop(&mut trainer, &TrainConfig::new(spec.epochs)).unwrap();
            assert_eq!(outcome.epochs_run, spec.epochs);
        }

        let all_match = set.samples().iter().all(|sample| {
            classify(&mut network, &sample.grid).unwrap() == sample.label
        });
        if all_match {
            learned = true;
            break;
        }
    }
    assert!(learned, "no seed learned the letter set");
}

#[test]
fn saved_training_set_trains_the_same_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letters.json");
    let mut set = letter_set();
    set.save_as(&path).unwrap();
    let reloaded = TrainingSet::open(&path).unwrap();

    let spec = NetworkSpec { hidden_count: 6, ..NetworkSpec::default() };
    let mut a = Network::from_spec_with_rng(&spec, &mut StdRng::seed_from_u64(9));
    let mut b = Network::from_spec_with_rng(&spec, &mut StdRng::seed_from_u64(9));

    for (net, source) in [(&mut a, &set), (&mut b, &reloaded)] {
        let mut trainer = BackPropagator::new(net, 0.7);
        source.populate(&mut trainer).unwrap();
        for _ in 0..20 {
            trainer.run_and_update().unwrap();
        }
    }

    let probe = encode_grid(&set.get(2).unwrap().grid);
    assert_eq!(a.fire(&probe).unwrap(), b.fire(&probe).unwrap());
}
