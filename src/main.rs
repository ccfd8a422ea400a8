fn main() {
    autocaption_lib::run()
}
