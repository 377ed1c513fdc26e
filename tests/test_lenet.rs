use bgline::{Backend, ImageDataFormat, LeNet, TensorShape};

#[test]
fn test_shape_follows_backend_format() -> anyhow::Result<()> {
    let first = LeNet::build(3, 32, 32, 10, None, None, &Backend::new(ImageDataFormat::ChannelsFirst))?;
    let last = LeNet::build(3, 32, 32, 10, None, None, &Backend::new(ImageDataFormat::ChannelsLast))?;

    assert_eq!(first.input_shape, TensorShape(3, 32, 32));
    assert_eq!(last.input_shape, TensorShape(32, 32, 3));
    Ok(())
}

#[test]
fn test_zero_classes_rejected() {
    assert!(LeNet::build(1, 28, 28, 0, None, None, &Backend::default()).is_err());
}
