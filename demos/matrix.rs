use dense_nn::Matrix;

fn main() -> dense_nn::Result<()> {
    // 4x4 of zeros and a 3x4 filled from [-5, 5)
    let zeros = Matrix::new(4, 4);
    let random = Matrix::new(3, 4).randomize(-5.0, 5.0);

    println!("Zero matrix:");
    zeros.render();
    println!("Random matrix:");
    random.render();

    let a = Matrix::from_values(2, 2, &[
        1.0, 1.5,
        0.4, 2.0,
    ]);
    let b = Matrix::from_values(2, 2, &[
        3.0, 6.2,
        1.8, 4.1,
    ]);

    println!("a o b:");
    a.hadamard(&b)?.render();
    println!("a * b:");
    a.multiply(&b)?.render();
    println!("a * 2:");
    (&a * 2.0).render();
    println!("a + b:");
    (&a + &b).render();
    println!("a - b:");
    (&a - &b).render();

    let mut a = a;
    println!("a[0, 0] = {}", a.get(0, 0)?);
    a.set(0, 0, 4.2)?;

    println!("transposed:");
    a.transpose().render();
    println!("doubled:");
    a.map(|x| x * 2.0).render();

    Ok(())
}
