use ferrite_ocr::{BackPropagator, Network};

// Three inputs, one output: 0 when all inputs agree, 1 otherwise.
fn main() -> ferrite_ocr::Result<()> {
    let mut network = Network::new(3, 1, 2);

    let samples = [
        ([1.0, 1.0, 1.0], 0.0),
        ([1.0, 1.0, 0.0], 1.0),
        ([1.0, 0.0, 1.0], 1.0),
        ([1.0, 0.0, 0.0], 1.0),
        ([0.0, 1.0, 1.0], 1.0),
        ([0.0, 1.0, 0.0], 1.0),
        ([0.0, 0.0, 1.0], 1.0),
        ([0.0, 0.0, 0.0], 0.0),
    ];

    let mut trainer = BackPropagator::new(&mut network, 0.8);
    for (input, expected) in &samples {
        trainer.add_input_output(input.to_vec(), vec![*expected])?;
    }

    for epoch in 0..50_000 {
        let error = trainer.run_and_update()?;
        if epoch % 5_000 == 0 {
            println!("Epoch {epoch}: average error = {error:.6}");
        }
    }

    for (input, _) in &samples {
        println!("Input: {:?} -> Output: {:.4}", input, network.fire(input)?[0]);
    }
    Ok(())
}
