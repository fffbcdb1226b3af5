use gf128_field::field::FiniteField;

fn main() {
    let f = FiniteField::new(0xFFFF_FFFF_0000_0001);
    let coeffs = f.vector_from_values((1..=16).collect());
    let root = f.get_root_of_unity(16).unwrap();
    let roots = f.get_power_cycle(root).unwrap();
    let evals = f.eval_poly_at_roots(&coeffs, &roots).unwrap();
    println!("{:?}", evals.to_values());
}
