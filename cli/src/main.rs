fn main() {
    println!("itn-cli: placeholder, the API surface is out of scope for the core engine");
}
