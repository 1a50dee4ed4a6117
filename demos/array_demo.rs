// Draws a few descriptors, shapes and arrays, then replays one of them from
// its recorded stream.

use conjecture_arrays::{
    array_shapes, arrays, scalar_dtypes, DataSource, Drawn, Generator, ShapeConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dtypes = scalar_dtypes()?;
    let shapes = array_shapes(ShapeConfig {
        max_side: 4,
        ..ShapeConfig::default()
    })?;

    let mut source = DataSource::from_seed(2024);
    for _ in 0..5 {
        let dtype = dtypes.draw(&mut source)?;
        let shape = shapes.draw(&mut source)?;
        let generator = arrays(dtype, shape.clone(), None)?;
        if let Drawn::Array(array) = source.draw(&generator)? {
            println!("{} {:?}: {:?}", dtype, shape, array.as_slice());
        }
    }

    println!();
    let matrices = arrays("<u2", [2, 2], None)?;
    let mut source = DataSource::from_seed(7);
    let drawn = source.draw(&matrices)?;
    let mut replay = DataSource::from_vec(source.into_record());
    let replayed = replay.draw(&matrices)?;
    println!("<u2 (2, 2): {:?}", drawn);
    println!("replayed identically: {}", drawn == replayed);

    println!();
    match arrays("<f8", [2, 0], None) {
        Err(err) => println!("{}", err),
        Ok(_) => println!("unexpected generator"),
    }
    Ok(())
}
