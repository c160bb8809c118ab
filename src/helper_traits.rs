// A function defined on the surface of a sphere `S`, parameterized by the azimuth and
// elevation under which it is viewed.
pub trait SphericalFunction {
    fn lookup(&self, az: f32, el: f32) -> f32;

    fn lookup_many(&self, angles: impl Iterator<Item = (f32, f32)>) -> Vec<f32>
    where
        Self: Sized,
    {
        angles.map(|(az, el)| self.lookup(az, el)).collect()
    }
}
