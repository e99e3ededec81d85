use std::fmt::{Debug, Display};

pub trait ElemBase: 
    Default + 
    PartialEq + 
    Copy + 
    Send + 
    Sync + 
    Display + 
    Debug + 
    'static
{}

impl<T> ElemBase for T where T: 
    Default + 
    PartialEq + 
    Copy + 
    Send + 
    Sync + 
    Display + 
    Debug + 
    'static
{}
